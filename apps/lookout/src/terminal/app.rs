use crossterm::event::Event;
use crossterm::terminal;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ShellConfig;
use crate::session::Session;
use crate::telemetry::logging;
use crate::terminal::cli::{Cli, Command, ExecArgs};
use crate::terminal::error::CliError;
use crate::terminal::prompt::{EditorAction, InputPump, LineEditor, ScreenGuard};
use crate::terminal::render::{self, Frame, StyledLine};
use lookout_core::{SessionHost, Submission};

const REPOSITORY_WAIT: Duration = Duration::from_secs(10);

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ShellConfig::try_from(&cli)?;

    let interactive = !matches!(cli.command, Some(Command::Exec(_)));
    let log_config = if interactive {
        cli.logging.to_config().for_interactive()
    } else {
        cli.logging.to_config()
    };
    logging::init(&log_config).map_err(|err| CliError::Logging(err.to_string()))?;
    debug!(level = log_config.level.as_str(), interactive, "logging ready");

    let session = Session::start(&config)?;
    match cli.command {
        Some(Command::Exec(args)) => exec(session, args).await,
        Some(Command::Shell) | None => shell(session).await,
    }
}

/// Runs each line in order against one session and prints what it added to
/// the transcript.
async fn exec(mut session: Session, args: ExecArgs) -> Result<(), CliError> {
    session.wait_for_repositories(REPOSITORY_WAIT).await;
    session
        .wait_for_presence(Duration::from_secs(args.feed_wait))
        .await;

    let mut seen = 0;
    for line in &args.lines {
        session.dispatcher.submit(line).await;
        let (entries, mark) = session.host.transcript_since(seen);
        seen = mark;
        let mut stdout = io::stdout().lock();
        for entry in &entries {
            writeln!(stdout, "{}", render::plain_entry(entry))?;
        }
        stdout.flush()?;
    }

    session.close().await;
    Ok(())
}

async fn shell(mut session: Session) -> Result<(), CliError> {
    let _screen = ScreenGuard::enter()?;
    let (pump, mut input) = InputPump::start();
    let mut editor = LineEditor::new();
    let mut clock = interval(Duration::from_secs(1));
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    session.dispatcher.run_unrecorded("welcome").await;
    let mut presence_open = session.feed_enabled();
    info!("interactive session started");

    let mut stdout = io::stdout();
    loop {
        redraw(&mut stdout, &session, editor.buffer())?;
        tokio::select! {
            event = input.recv() => {
                let Some(event) = event else { break };
                let Event::Key(key) = event else { continue };
                match editor.handle(key, &session.dispatcher) {
                    EditorAction::Submit(line) => {
                        if let Submission::Ready(pending) = session.dispatcher.begin(&line) {
                            tokio::spawn(pending.run());
                        }
                    }
                    EditorAction::Quit => break,
                    EditorAction::Redraw | EditorAction::Nothing => {}
                }
            }
            Some(_) = session.events.recv() => {}
            changed = session.presence.changed(), if presence_open => {
                if changed.is_err() {
                    presence_open = false;
                    debug!("presence feed stopped publishing");
                }
            }
            _ = clock.tick() => {}
        }
    }

    drop(pump);
    session.close().await;
    info!("interactive session closed");
    Ok(())
}

fn redraw(out: &mut impl Write, session: &Session, input: &str) -> Result<(), CliError> {
    let lines: Vec<StyledLine> = session
        .host
        .transcript()
        .iter()
        .flat_map(render::styled_lines)
        .collect();
    let status = render::status_line(
        &session.presence.borrow(),
        &session.zones,
        chrono::Utc::now(),
    );
    let size = terminal::size().map_err(|err| CliError::Runtime(err.to_string()))?;
    render::draw(
        out,
        &Frame {
            theme: session.host.theme(),
            show_banner: session.host.show_banner(),
            lines: &lines,
            status: &status,
            input,
        },
        size,
    )?;
    Ok(())
}
