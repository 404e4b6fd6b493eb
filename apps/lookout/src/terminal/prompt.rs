use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

use lookout_core::Dispatcher;

/// What the main loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Nothing,
    Redraw,
    Submit(String),
    Quit,
}

/// Single-line input buffer with history recall through the dispatcher.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn handle(&mut self, key: KeyEvent, dispatcher: &Dispatcher) -> EditorAction {
        if key.kind == KeyEventKind::Release {
            return EditorAction::Nothing;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('d') => EditorAction::Quit,
                KeyCode::Char('u') => {
                    self.buffer.clear();
                    EditorAction::Redraw
                }
                _ => EditorAction::Nothing,
            };
        }

        match key.code {
            KeyCode::Enter => EditorAction::Submit(std::mem::take(&mut self.buffer)),
            KeyCode::Up => {
                self.buffer = dispatcher.previous();
                EditorAction::Redraw
            }
            KeyCode::Down => {
                self.buffer = dispatcher.next();
                EditorAction::Redraw
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_some() {
                    EditorAction::Redraw
                } else {
                    EditorAction::Nothing
                }
            }
            KeyCode::Esc => {
                self.buffer.clear();
                EditorAction::Redraw
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.buffer.push(c);
                EditorAction::Redraw
            }
            _ => EditorAction::Nothing,
        }
    }
}

/// Raw mode plus alternate screen for the lifetime of the guard.
pub struct ScreenGuard {
    was_raw: bool,
}

impl ScreenGuard {
    pub fn enter() -> io::Result<Self> {
        let was_raw = crossterm::terminal::is_raw_mode_enabled().unwrap_or(false);
        if !was_raw {
            enable_raw_mode()?;
        }
        let guard = Self { was_raw };
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
        let _ = stdout.flush();
        if !self.was_raw {
            let _ = disable_raw_mode();
        }
    }
}

/// Reads terminal events on a plain thread and forwards them to the async
/// side. Stops when dropped.
pub struct InputPump {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl InputPump {
    pub fn start() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => match event::read() {
                        Ok(ev) => {
                            if tx.send(ev).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            warn!(target: "lookout::terminal", error = %err, "failed to read terminal event");
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(err) => {
                        warn!(target: "lookout::terminal", error = %err, "failed to poll terminal");
                        break;
                    }
                }
            }
        });
        (
            Self {
                stop,
                thread: Some(thread),
            },
            rx,
        )
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
