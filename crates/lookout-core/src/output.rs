use serde::{Deserialize, Serialize};
use std::fmt;

/// One renderable line of command output.
///
/// The host decides how each variant looks; the core only fixes the order and
/// the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Line {
    Heading { text: String },
    Text { text: String },
    Item { text: String },
    Field { label: String, value: String },
    Link { label: String, url: String },
    Preformatted { text: String },
}

impl Line {
    /// Plain-text rendering, used by non-interactive hosts and in tests.
    pub fn plain(&self) -> String {
        match self {
            Line::Heading { text } | Line::Text { text } | Line::Preformatted { text } => {
                text.clone()
            }
            Line::Item { text } => format!("- {text}"),
            Line::Field { label, value } => format!("{label}: {value}"),
            Line::Link { label, url } => format!("{label} <{url}>"),
        }
    }
}

/// Ordered output produced by a single command. An empty output appends
/// nothing to the transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    lines: Vec<Line>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    pub fn with_heading(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Heading { text: text.into() });
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Text { text: text.into() });
        self
    }

    pub fn with_item(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Item { text: text.into() });
        self
    }

    pub fn with_field(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.lines.push(Line::Field {
            label: label.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.lines.push(Line::Link {
            label: label.into(),
            url: url.into(),
        });
        self
    }

    pub fn with_preformatted(mut self, text: impl Into<String>) -> Self {
        self.lines.push(Line::Preformatted { text: text.into() });
        self
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, line) in self.lines.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            f.write_str(&line.plain())?;
        }
        Ok(())
    }
}

/// An item appended to the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "entry")]
pub enum TranscriptEntry {
    /// The submitted line, echoed before the command runs.
    Echo { line: String },
    Output { output: Output },
    /// Fixed-format messages: unknown commands and command failures.
    Notice { text: String },
}

impl TranscriptEntry {
    pub fn echo(line: impl Into<String>) -> Self {
        TranscriptEntry::Echo { line: line.into() }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        TranscriptEntry::Notice { text: text.into() }
    }

    pub fn plain(&self) -> String {
        match self {
            TranscriptEntry::Echo { line } => line.clone(),
            TranscriptEntry::Output { output } => output.to_string(),
            TranscriptEntry::Notice { text } => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// `light` selects light; every other value falls back to dark.
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("light") {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The presentation surface the shell runs inside.
///
/// Implementations must be safe to call from several tasks: asynchronous
/// commands append their output whenever they complete.
pub trait SessionHost: Send + Sync {
    fn append(&self, entry: TranscriptEntry);
    fn clear_transcript(&self);
    fn set_theme(&self, theme: Theme);
    fn theme(&self) -> Theme;
    /// Flips the ASCII banner flag and returns its new value.
    fn toggle_ascii(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_lines_in_order() {
        let output = Output::new()
            .with_heading("Now Playing:")
            .with_link("Song - Artist", "https://example.com/t/1")
            .with_field("Progress", "42%");
        assert_eq!(
            output.to_string(),
            "Now Playing:\nSong - Artist <https://example.com/t/1>\nProgress: 42%"
        );
    }

    #[test]
    fn theme_argument_defaults_to_dark() {
        assert_eq!(Theme::from_arg("light"), Theme::Light);
        assert_eq!(Theme::from_arg("LIGHT"), Theme::Light);
        assert_eq!(Theme::from_arg("dark"), Theme::Dark);
        assert_eq!(Theme::from_arg("solarized"), Theme::Dark);
    }
}
