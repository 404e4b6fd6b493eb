use chrono::{DateTime, Utc};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

use crate::commands::profile::{BANNER, PROMPT};
use crate::zones::ZoneConfig;
use lookout_core::{Line, PresenceView, Theme, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Prompt,
    Heading,
    Text,
    Link,
    Notice,
    Preformatted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub kind: LineKind,
    pub text: String,
}

impl StyledLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

struct Palette {
    prompt: Color,
    heading: Color,
    text: Color,
    link: Color,
    notice: Color,
    status: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                prompt: Color::Blue,
                heading: Color::White,
                text: Color::Green,
                link: Color::Cyan,
                notice: Color::Yellow,
                status: Color::Grey,
            },
            Theme::Light => Palette {
                prompt: Color::DarkBlue,
                heading: Color::Black,
                text: Color::Black,
                link: Color::DarkBlue,
                notice: Color::DarkRed,
                status: Color::DarkGrey,
            },
        }
    }

    fn color(&self, kind: LineKind) -> Color {
        match kind {
            LineKind::Prompt => self.prompt,
            LineKind::Heading => self.heading,
            LineKind::Text | LineKind::Preformatted => self.text,
            LineKind::Link => self.link,
            LineKind::Notice => self.notice,
        }
    }
}

/// Splits a transcript entry into screen lines.
pub fn styled_lines(entry: &TranscriptEntry) -> Vec<StyledLine> {
    match entry {
        TranscriptEntry::Echo { line } => vec![StyledLine::new(LineKind::Prompt, format!("{PROMPT}{line}"))],
        TranscriptEntry::Notice { text } => split(LineKind::Notice, text),
        TranscriptEntry::Output { output } => output
            .lines()
            .iter()
            .flat_map(|line| {
                let kind = match line {
                    Line::Heading { .. } => LineKind::Heading,
                    Line::Link { .. } => LineKind::Link,
                    Line::Preformatted { .. } => LineKind::Preformatted,
                    Line::Text { .. } | Line::Item { .. } | Line::Field { .. } => LineKind::Text,
                };
                split(kind, &line.plain())
            })
            .collect(),
    }
}

fn split(kind: LineKind, text: &str) -> Vec<StyledLine> {
    if text.is_empty() {
        return vec![StyledLine::new(kind, "")];
    }
    text.lines().map(|l| StyledLine::new(kind, l)).collect()
}

/// Plain rendering used by `exec`: echoes carry the prompt.
pub fn plain_entry(entry: &TranscriptEntry) -> String {
    styled_lines(entry)
        .into_iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// The bottom bar: current track, reference clock, and presence status.
pub fn status_line(view: &PresenceView, zones: &ZoneConfig, now: DateTime<Utc>) -> String {
    let playing = view
        .snapshot
        .as_ref()
        .and_then(|s| s.track.as_ref())
        .map(|t| t.display())
        .unwrap_or_else(|| "Nothing".to_owned());
    let status = view
        .snapshot
        .as_ref()
        .map(|s| s.status.label())
        .unwrap_or("Loading...");
    format!(
        "Now playing: {playing} | {} Time: {} | Discord Status: {status} ({})",
        zones.reference_place(),
        zones.reference_wall(now).format("%H:%M"),
        view.feed.label()
    )
}

pub struct Frame<'a> {
    pub theme: Theme,
    pub show_banner: bool,
    pub lines: &'a [StyledLine],
    pub status: &'a str,
    pub input: &'a str,
}

/// Redraws the whole screen; the transcript is tail-clipped to fit.
pub fn draw(out: &mut impl Write, frame: &Frame<'_>, size: (u16, u16)) -> io::Result<()> {
    let (width, height) = (usize::from(size.0.max(1)), usize::from(size.1));
    let palette = Palette::for_theme(frame.theme);
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    let mut row: u16 = 0;
    if frame.show_banner {
        queue!(out, SetForegroundColor(palette.text))?;
        for line in BANNER.lines() {
            queue!(out, MoveTo(0, row), Print(clip(line, width)))?;
            row += 1;
        }
    }

    // Two rows stay reserved for the prompt and the status bar.
    let room = height.saturating_sub(usize::from(row) + 2);
    let start = frame.lines.len().saturating_sub(room);
    for line in &frame.lines[start..] {
        queue!(
            out,
            MoveTo(0, row),
            SetForegroundColor(palette.color(line.kind)),
            Print(clip(&line.text, width))
        )?;
        row += 1;
    }

    queue!(
        out,
        MoveTo(0, row),
        SetForegroundColor(palette.prompt),
        Print(PROMPT),
        SetForegroundColor(palette.text),
        Print(clip(frame.input, width.saturating_sub(PROMPT.len())))
    )?;
    let cursor_col = (PROMPT.len() + frame.input.chars().count()).min(width - 1) as u16;

    if height > 0 {
        queue!(
            out,
            MoveTo(0, size.1 - 1),
            SetForegroundColor(palette.status),
            SetAttribute(Attribute::Reverse),
            Print(format!("{:<width$}", clip(frame.status, width))),
            SetAttribute(Attribute::Reset),
        )?;
    }
    queue!(out, ResetColor, MoveTo(cursor_col, row))?;
    out.flush()
}

fn clip(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookout_core::{FeedState, OnlineStatus, Output, PresenceSnapshot, Track};
    use std::sync::Arc;

    #[test]
    fn entries_become_kinded_lines() {
        let output = Output::new()
            .with_heading("Now Playing:")
            .with_link("Song - Artist", "https://open.spotify.com/track/1")
            .with_preformatted("[##--] 0:10 / 0:20\nsecond row");
        let lines = styled_lines(&TranscriptEntry::Output { output });
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [
                LineKind::Heading,
                LineKind::Link,
                LineKind::Preformatted,
                LineKind::Preformatted
            ]
        );
        assert_eq!(lines[1].text, "Song - Artist <https://open.spotify.com/track/1>");
        assert_eq!(
            plain_entry(&TranscriptEntry::echo("help")),
            "visitor@lookout:~$ help"
        );
    }

    #[test]
    fn status_line_before_and_after_first_frame() {
        use crate::zones::LocalZone;
        use chrono::TimeZone;

        let zones = ZoneConfig {
            reference: chrono_tz::Europe::London,
            local: LocalZone::System,
        };
        let now = Utc
            .with_ymd_and_hms(2024, 7, 1, 12, 30, 0)
            .single()
            .expect("valid instant");
        assert_eq!(
            status_line(&PresenceView::default(), &zones, now),
            "Now playing: Nothing | London Time: 13:30 | Discord Status: Loading... (connecting)"
        );

        let view = PresenceView {
            feed: FeedState::Receiving,
            snapshot: Some(Arc::new(PresenceSnapshot {
                status: OnlineStatus::Dnd,
                activities: Vec::new(),
                track: Some(Track {
                    title: "Song".into(),
                    artist: "Artist".into(),
                    album: None,
                    external_id: None,
                    album_art_url: None,
                    start: None,
                    end: None,
                }),
            })),
        };
        assert_eq!(
            status_line(&view, &zones, now),
            "Now playing: Song - Artist | London Time: 13:30 | Discord Status: Do Not Disturb (live)"
        );
    }

    #[test]
    fn draw_writes_prompt_and_status() {
        let lines = styled_lines(&TranscriptEntry::echo("echo hi"));
        let frame = Frame {
            theme: Theme::Dark,
            show_banner: false,
            lines: &lines,
            status: "status bar",
            input: "ec",
        };
        let mut buf = Vec::new();
        draw(&mut buf, &frame, (80, 10)).expect("draw");
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("visitor@lookout:~$ echo hi"));
        assert!(text.contains("status bar"));
        assert!(text.contains("ec"));
    }
}
