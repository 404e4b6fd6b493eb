use parking_lot::Mutex;
use tokio::sync::mpsc;

use lookout_core::{SessionHost, Theme, TranscriptEntry};

/// Tells the front-end that something on screen changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Appended,
    Cleared,
    Theme(Theme),
    Banner(bool),
}

#[derive(Debug)]
struct Screen {
    transcript: Vec<TranscriptEntry>,
    theme: Theme,
    show_banner: bool,
}

/// [`SessionHost`] backed by an in-memory transcript that the terminal
/// front-end redraws from.
pub struct TerminalHost {
    screen: Mutex<Screen>,
    events: mpsc::UnboundedSender<HostEvent>,
}

impl TerminalHost {
    pub fn new(theme: Theme) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let host = Self {
            screen: Mutex::new(Screen {
                transcript: Vec::new(),
                theme,
                show_banner: true,
            }),
            events,
        };
        (host, rx)
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.screen.lock().transcript.clone()
    }

    /// Entries appended since `seen`; returns the new watermark too.
    pub fn transcript_since(&self, seen: usize) -> (Vec<TranscriptEntry>, usize) {
        let screen = self.screen.lock();
        let start = seen.min(screen.transcript.len());
        (screen.transcript[start..].to_vec(), screen.transcript.len())
    }

    pub fn show_banner(&self) -> bool {
        self.screen.lock().show_banner
    }

    fn notify(&self, event: HostEvent) {
        // The receiver is gone once the front-end has shut down.
        let _ = self.events.send(event);
    }
}

impl SessionHost for TerminalHost {
    fn append(&self, entry: TranscriptEntry) {
        self.screen.lock().transcript.push(entry);
        self.notify(HostEvent::Appended);
    }

    fn clear_transcript(&self) {
        self.screen.lock().transcript.clear();
        self.notify(HostEvent::Cleared);
    }

    fn set_theme(&self, theme: Theme) {
        self.screen.lock().theme = theme;
        self.notify(HostEvent::Theme(theme));
    }

    fn theme(&self) -> Theme {
        self.screen.lock().theme
    }

    fn toggle_ascii(&self) -> bool {
        let shown = {
            let mut screen = self.screen.lock();
            screen.show_banner = !screen.show_banner;
            screen.show_banner
        };
        self.notify(HostEvent::Banner(shown));
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_notifies() {
        let (host, mut events) = TerminalHost::new(Theme::Dark);
        host.append(TranscriptEntry::echo("help"));
        host.set_theme(Theme::Light);
        assert!(!host.toggle_ascii());
        host.clear_transcript();

        assert!(host.transcript().is_empty());
        assert_eq!(host.theme(), Theme::Light);
        assert!(!host.show_banner());

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            [
                HostEvent::Appended,
                HostEvent::Theme(Theme::Light),
                HostEvent::Banner(false),
                HostEvent::Cleared
            ]
        );
    }

    #[test]
    fn since_tracks_watermark_across_clear() {
        let (host, _events) = TerminalHost::new(Theme::Dark);
        host.append(TranscriptEntry::echo("a"));
        host.append(TranscriptEntry::echo("b"));
        let (entries, mark) = host.transcript_since(0);
        assert_eq!(entries.len(), 2);
        host.append(TranscriptEntry::echo("c"));
        let (entries, mark) = host.transcript_since(mark);
        assert_eq!(entries, [TranscriptEntry::echo("c")]);
        host.clear_transcript();
        let (entries, mark) = host.transcript_since(mark);
        assert!(entries.is_empty());
        assert_eq!(mark, 0);
    }
}
