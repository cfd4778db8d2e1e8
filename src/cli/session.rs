//! Interactive labeling over stdin
//!
//! Each line is one command, standing in for the keyboard shortcuts of a
//! graphical front end. Playback progress is printed by a console sink.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::label_interactor::{LabelSession, Mutation, PlayState, SeekOutcome};
use crate::app::study_interactor::ExportKind;
use crate::cli::args::LabelArgs;
use crate::config::PlaybackConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{format_clock, Category};
use crate::domain::recorder::{ToggleOutcome, UndoOutcome};
use crate::engine::playback::PlaybackEvent;
use crate::output::report::render_stats;
use crate::utils::TimeParser;

const HELP: &str = "\
commands:
  p | play | pause     toggle playback
  k                    start/stop a value-adding label
  d                    start/stop an other label
  z | undo             undo the open label, else the last label
  f / b                forward / back by the short step
  F / B                forward / back by the long step
  seek <+-secs>        relative seek (also MM:SS)
  goto <time>          absolute seek (secs, MM:SS, HH:MM:SS)
  frame <n>            seek to a frame
  jump <i>             seek to the start of label i
  speed <x>            playback speed factor
  status | list | stats
  save | csv | report
  help | quit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    TogglePlay,
    Toggle(Category),
    Undo,
    Seek(f64),
    Goto(f64),
    Frame(u64),
    Jump(usize),
    Speed(f64),
    Status,
    List,
    Stats,
    Save,
    Csv,
    Report,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse a line; blank lines yield `None`
    pub fn parse(line: &str, playback: &PlaybackConfig) -> Result<Option<Self>, DomainError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        let parser = TimeParser::new();
        let required = |name: &str| {
            arg.ok_or_else(|| DomainError::BadArgs(format!("'{}' needs an argument", name)))
        };

        let command = match head {
            "p" | "play" | "pause" => SessionCommand::TogglePlay,
            "k" => SessionCommand::Toggle(Category::ValueAdding),
            "d" => SessionCommand::Toggle(Category::Other),
            "z" | "undo" => SessionCommand::Undo,
            "f" => SessionCommand::Seek(playback.short_seek_secs),
            "b" => SessionCommand::Seek(-playback.short_seek_secs),
            "F" => SessionCommand::Seek(playback.long_seek_secs),
            "B" => SessionCommand::Seek(-playback.long_seek_secs),
            "seek" => SessionCommand::Seek(parser.parse_offset(required(head)?)?),
            "goto" => SessionCommand::Goto(parser.parse_time(required(head)?)?),
            "frame" => SessionCommand::Frame(parse_number(required(head)?)?),
            "jump" => SessionCommand::Jump(parse_number(required(head)?)?),
            "speed" => {
                let value = required(head)?;
                let value = value.trim_end_matches('x');
                SessionCommand::Speed(value.parse().map_err(|_| {
                    DomainError::BadArgs(format!("Invalid speed: {}", value))
                })?)
            }
            "status" | "s" => SessionCommand::Status,
            "list" | "l" => SessionCommand::List,
            "stats" => SessionCommand::Stats,
            "save" => SessionCommand::Save,
            "csv" => SessionCommand::Csv,
            "report" => SessionCommand::Report,
            "help" | "h" | "?" => SessionCommand::Help,
            "quit" | "q" | "exit" => SessionCommand::Quit,
            other => {
                return Err(DomainError::BadArgs(format!(
                    "Unknown command '{}', try 'help'",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, DomainError> {
    value
        .parse()
        .map_err(|_| DomainError::BadArgs(format!("Not a whole number: {}", value)))
}

/// Lets a report through at most once per interval
#[derive(Debug)]
pub struct ReportThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ReportThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn should_report(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Print playback progress at most once per second until the channel closes
pub fn spawn_console_sink(mut events: mpsc::Receiver<PlaybackEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut throttle = ReportThrottle::new(Duration::from_secs(1));
        while let Some(event) = events.recv().await {
            match event {
                PlaybackEvent::Frame {
                    position,
                    frame_index,
                    ..
                } => {
                    if throttle.should_report(Instant::now()) {
                        println!("  > {} (frame {})", format_clock(position), frame_index);
                    }
                }
                PlaybackEvent::Ended { position } => {
                    println!("  > end of video at {}", format_clock(position));
                    throttle.reset();
                }
            }
        }
    })
}

/// Execute the label command
pub async fn label(
    container: &DefaultAppContainer,
    playback: &PlaybackConfig,
    args: LabelArgs,
) -> Result<()> {
    let (events_tx, events_rx) = mpsc::channel(64);
    let sink = spawn_console_sink(events_rx);

    let mut session = container
        .open_session(&args.input, events_tx)
        .await
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    if let Some(speed) = args.speed {
        session.set_speed(speed).context("Invalid --speed")?;
    }

    let media = session.media();
    println!(
        "{}: {}x{} @ {:.2} fps, {} ({} frames)",
        args.input.display(),
        media.width,
        media.height,
        media.frame_rate,
        format_clock(media.duration),
        media.frame_count
    );
    for warning in session.load_warnings() {
        println!("warning: {}", warning);
    }
    println!("{} labels loaded. Type 'help' for commands.", session.segments().len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                break;
            }
        };

        let command = match SessionCommand::parse(&line, playback) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };
        if command == SessionCommand::Quit {
            break;
        }
        if let Err(e) = dispatch(container, &mut session, command).await {
            println!("error: {}", e);
        }
    }

    match session.close().await {
        Some(Ok(path)) => println!("Labels saved to {}", path.display()),
        Some(Err(e)) => println!("error: {}", e),
        None => {}
    }
    drop(session);
    let _ = sink.await;
    Ok(())
}

async fn dispatch(
    container: &DefaultAppContainer,
    session: &mut LabelSession,
    command: SessionCommand,
) -> Result<(), DomainError> {
    match command {
        SessionCommand::TogglePlay => match session.toggle_play().await? {
            PlayState::Playing { from } => println!("playing from {}", format_clock(from)),
            PlayState::Paused { at } => println!(
                "paused at {} (frame {})",
                format_clock(at),
                session.media().frame_at(at)
            ),
        },
        SessionCommand::Toggle(category) => {
            let mutation = session.toggle(category).await?;
            match &mutation.outcome {
                ToggleOutcome::Opened(open) => println!(
                    "{} started at {}",
                    open.category,
                    format_clock(session.media().time_of(open.start_frame))
                ),
                ToggleOutcome::Closed(segment) => println!(
                    "{} saved: {} - {} ({})",
                    segment.category(),
                    segment.start_str(),
                    segment.end_str(),
                    format_clock(segment.duration_seconds())
                ),
            }
            report_save(&mutation);
        }
        SessionCommand::Undo => {
            let mutation = session.undo().await?;
            match &mutation.outcome {
                UndoOutcome::DiscardedOpen(open) => println!("discarded open {} label", open.category),
                UndoOutcome::RemovedSegment(segment) => println!(
                    "removed {} {} - {}",
                    segment.category(),
                    segment.start_str(),
                    segment.end_str()
                ),
                UndoOutcome::Nothing => println!("nothing to undo"),
            }
            report_save(&mutation);
        }
        SessionCommand::Seek(seconds) => print_seek(session.seek_relative(seconds).await?),
        SessionCommand::Goto(seconds) => print_seek(session.seek_to_time(seconds).await?),
        SessionCommand::Frame(frame) => print_seek(session.seek_to_frame(frame).await?),
        SessionCommand::Jump(number) => print_seek(session.jump_to_segment(number).await?),
        SessionCommand::Speed(speed) => {
            session.set_speed(speed)?;
            println!("speed {}x", speed);
        }
        SessionCommand::Status => print_status(session).await,
        SessionCommand::List => {
            if session.segments().is_empty() {
                println!("no labels");
            }
            for (i, segment) in session.segments().iter().enumerate() {
                println!(
                    "{:>4}  {} - {}  {:>8}  {}",
                    i + 1,
                    segment.start_str(),
                    segment.end_str(),
                    format_clock(segment.duration_seconds()),
                    segment.category()
                );
            }
        }
        SessionCommand::Stats => print!(
            "{}",
            render_stats(&session.summary(), session.cycle_report().as_ref())
        ),
        SessionCommand::Save => {
            let path = session.save().await?;
            println!("saved {}", path.display());
        }
        SessionCommand::Csv => export(container, session, ExportKind::Csv)?,
        SessionCommand::Report => export(container, session, ExportKind::Report)?,
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => {}
    }
    Ok(())
}

fn export(
    container: &DefaultAppContainer,
    session: &LabelSession,
    kind: ExportKind,
) -> Result<(), DomainError> {
    let written = container.study_interactor().export(
        session.video_path(),
        session.segments(),
        session.media().duration,
        kind,
    )?;
    for path in written {
        println!("written {}", path.display());
    }
    Ok(())
}

fn report_save<T>(mutation: &Mutation<T>) {
    if let Some(Err(e)) = &mutation.save {
        println!("warning: labels not saved: {}", e);
    }
}

fn print_seek(outcome: SeekOutcome) {
    println!(
        "at {} (frame {}){}",
        format_clock(outcome.position),
        outcome.frame_index,
        if outcome.resumed { ", playing" } else { "" }
    );
}

async fn print_status(session: &LabelSession) {
    let position = session.position().await;
    let media = session.media();
    println!(
        "{} / {}  frame {}/{}  {}  speed {}x  {} labels",
        format_clock(position),
        format_clock(media.duration),
        media.frame_at(position),
        media.frame_count,
        if session.is_playing() { "playing" } else { "paused" },
        session.speed(),
        session.segments().len()
    );
    if let Some(open) = session.open_segment() {
        println!(
            "open {} label since {} ({:.1}s)",
            open.category,
            format_clock(media.time_of(open.start_frame)),
            open.elapsed(media.frame_at(position), media.frame_rate)
        );
    }
}
