/// Which way the user is browsing through previously submitted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Older,
    Newer,
}

/// Submitted command lines plus a browsing cursor.
///
/// The cursor counts from the end: `-1` means "not browsing", `0` is the most
/// recent line. It always stays within `[-1, len - 1]`.
#[derive(Debug, Clone)]
pub struct HistoryNavigator {
    entries: Vec<String>,
    cursor: isize,
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: -1,
        }
    }

    /// Appends a submitted line and stops browsing.
    pub fn record(&mut self, line: impl Into<String>) {
        self.entries.push(line.into());
        self.cursor = -1;
    }

    /// Moves the cursor and returns the line that should fill the input.
    ///
    /// Both ends are sticky: going older past the first entry keeps returning
    /// it, going newer past the latest returns an empty line.
    pub fn navigate(&mut self, direction: Direction) -> String {
        let len = self.entries.len() as isize;
        match direction {
            Direction::Older => {
                if len == 0 {
                    return String::new();
                }
                self.cursor = (self.cursor + 1).min(len - 1);
            }
            Direction::Newer => {
                self.cursor = (self.cursor - 1).max(-1);
            }
        }
        self.current().unwrap_or_default()
    }

    fn current(&self) -> Option<String> {
        if self.cursor < 0 {
            return None;
        }
        let idx = self.entries.len() as isize - 1 - self.cursor;
        usize::try_from(idx)
            .ok()
            .and_then(|idx| self.entries.get(idx))
            .cloned()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(lines: &[&str]) -> HistoryNavigator {
        let mut history = HistoryNavigator::new();
        for line in lines {
            history.record(*line);
        }
        history
    }

    #[test]
    fn empty_history_returns_blank_in_both_directions() {
        let mut history = HistoryNavigator::new();
        assert_eq!(history.navigate(Direction::Older), "");
        assert_eq!(history.cursor(), -1);
        assert_eq!(history.navigate(Direction::Newer), "");
        assert_eq!(history.cursor(), -1);
    }

    #[test]
    fn older_walks_back_and_sticks_at_oldest() {
        let mut history = seeded(&["help", "about", "music"]);
        assert_eq!(history.navigate(Direction::Older), "music");
        assert_eq!(history.navigate(Direction::Older), "about");
        assert_eq!(history.navigate(Direction::Older), "help");
        assert_eq!(history.navigate(Direction::Older), "help");
        assert_eq!(history.navigate(Direction::Older), "help");
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn newer_past_latest_clears_input() {
        let mut history = seeded(&["help", "about"]);
        history.navigate(Direction::Older);
        history.navigate(Direction::Older);
        assert_eq!(history.navigate(Direction::Newer), "about");
        assert_eq!(history.navigate(Direction::Newer), "");
        assert_eq!(history.cursor(), -1);
        assert_eq!(history.navigate(Direction::Newer), "");
        assert_eq!(history.cursor(), -1);
    }

    #[test]
    fn recording_resets_cursor_and_keeps_duplicates() {
        let mut history = seeded(&["echo hi"]);
        history.navigate(Direction::Older);
        assert_eq!(history.cursor(), 0);
        history.record("echo hi");
        assert_eq!(history.cursor(), -1);
        assert_eq!(history.entries(), ["echo hi", "echo hi"]);
    }

    #[test]
    fn cursor_stays_in_bounds_as_history_grows() {
        let mut history = seeded(&["a"]);
        for round in 0..5 {
            for _ in 0..(round + 3) {
                history.navigate(Direction::Older);
                assert!(history.cursor() < history.len() as isize);
            }
            history.record(format!("line {round}"));
            assert_eq!(history.cursor(), -1);
        }
        assert_eq!(history.len(), 6);
    }
}
