use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use quiz_core::data::default_questions;
use quiz_core::model::{Question, validate_all};
use quiz_core::{SessionSnapshot, SessionStore, Transition};
use services::{CardController, Clock, TimingSettings, load_questions_from_path, spawn_driver};
use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
mod render;

use commands::{Command, HELP, parse_line};

const DRIVER_PERIOD: Duration = Duration::from_millis(50);

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(raw: String, flag: &'static str) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn env_number(name: &'static str) -> Result<Option<u64>, ArgsError> {
    std::env::var(name)
        .ok()
        .map(|value| parse_number(value, name))
        .transpose()
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--questions <path>] [--flip-delay-ms <ms>] \
         [--countdown-secs <s>] [--auto-close-ms <ms>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  built-in 16 question set");
    eprintln!("  --flip-delay-ms 650");
    eprintln!("  --countdown-secs 30");
    eprintln!("  --auto-close-ms 2000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_QUESTIONS, QUIZ_FLIP_DELAY_MS, QUIZ_COUNTDOWN_SECS, QUIZ_AUTO_CLOSE_MS");
    eprintln!("  RUST_LOG (e.g. RUST_LOG=debug)");
}

struct Args {
    questions: Option<PathBuf>,
    settings: TimingSettings,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = TimingSettings::default();
        let mut questions = std::env::var_os("QUIZ_QUESTIONS").map(PathBuf::from);
        let mut flip_ms = env_number("QUIZ_FLIP_DELAY_MS")?;
        let mut countdown_secs = env_number("QUIZ_COUNTDOWN_SECS")?;
        let mut auto_close_ms = env_number("QUIZ_AUTO_CLOSE_MS")?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--flip-delay-ms" => {
                    let value = require_value(args, "--flip-delay-ms")?;
                    flip_ms = Some(parse_number(value, "--flip-delay-ms")?);
                }
                "--countdown-secs" => {
                    let value = require_value(args, "--countdown-secs")?;
                    countdown_secs = Some(parse_number(value, "--countdown-secs")?);
                }
                "--auto-close-ms" => {
                    let value = require_value(args, "--auto-close-ms")?;
                    auto_close_ms = Some(parse_number(value, "--auto-close-ms")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg).into()),
            }
        }

        let countdown_seconds = match countdown_secs {
            Some(secs) => u32::try_from(secs).map_err(|_| ArgsError::InvalidNumber {
                flag: "--countdown-secs",
                raw: secs.to_string(),
            })?,
            None => defaults.countdown_seconds(),
        };
        let settings = TimingSettings::new(
            flip_ms.map_or(defaults.flip_delay(), Duration::from_millis),
            countdown_seconds,
            defaults.countdown_tick(),
            auto_close_ms.map_or(defaults.auto_close_delay(), Duration::from_millis),
        )?;

        Ok(Self {
            questions,
            settings,
        })
    }
}

fn load_questions(path: Option<&PathBuf>) -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!("loading questions from {}", path.display());
            Ok(load_questions_from_path(path)?)
        }
        None => Ok(validate_all(default_questions())?),
    }
}

/// Prints the summary once per completed session.
fn announce_completion(controller: &CardController, announced: &AtomicBool) {
    if let Some(summary) = controller.store().summary() {
        if !announced.swap(true, Ordering::SeqCst) {
            println!("{}", render::summary(&summary));
        }
    }
}

fn report(transition: Transition) {
    if let Transition::Ignored(reason) = transition {
        println!("(ignored: {reason:?})");
    }
}

fn dispatch(controller: &mut CardController, command: Command, announced: &AtomicBool) {
    match command {
        Command::Open(id) => report(controller.open_card(id)),
        Command::Close => report(controller.close_card()),
        Command::Countdown(id) => report(controller.start_countdown(id)),
        Command::Answer(id, input) => {
            let Some(kind) = controller.store().card(id).map(|card| card.kind()) else {
                println!("no card {id}");
                return;
            };
            match input.into_answer(kind) {
                Some(answer) => {
                    if controller.submit_answer(id, answer).is_none() {
                        println!("(answer not accepted)");
                    }
                }
                None => println!("that answer does not fit a {kind} question"),
            }
        }
        Command::Toggle(id, option) => {
            report(controller.toggle_option(id, option));
            if let Some(selection) = controller.selection(id) {
                let letters: String = selection
                    .iter()
                    .map(|&i| commands::option_letter(i))
                    .collect();
                println!("selected: {letters}");
            }
        }
        Command::Submit(id) => {
            if controller.submit_selection(id).is_none() {
                println!("(nothing to submit)");
            }
        }
        Command::Status => {
            let snapshot = controller.snapshot();
            println!("{}", render::board(&snapshot));
            println!("{}", render::progress_line(&snapshot.progress));
        }
        Command::Reset => {
            announced.store(false, Ordering::SeqCst);
            controller.restart();
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let questions = load_questions(args.questions.as_ref())?;
    let store = SessionStore::new(questions, Clock::system())?;
    let mut controller = CardController::new(store, args.settings);
    controller.subscribe(Box::new(|snapshot: &SessionSnapshot| {
        println!("{}", render::snapshot(snapshot));
    }));
    info!(
        "session ready: {} cards, {} points",
        controller.store().progress().total,
        controller.store().progress().max_score
    );

    let controller = Arc::new(Mutex::new(controller));
    let announced = Arc::new(AtomicBool::new(false));

    let driver = {
        let controller = Arc::clone(&controller);
        let announced = Arc::clone(&announced);
        spawn_driver(Arc::clone(&controller), DRIVER_PERIOD, move |events| {
            for event in &events {
                debug!("timer event: {event:?}");
                if let Some(line) = render::event(event) {
                    println!("{line}");
                }
            }
            if let Ok(controller) = controller.lock() {
                announce_completion(&controller, &announced);
            }
        })
    };

    println!("{HELP}");
    if let Ok(controller) = controller.lock() {
        println!("{}", render::board(&controller.snapshot()));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        let Ok(mut guard) = controller.lock() else {
            warn!("controller lock poisoned; exiting");
            break;
        };
        dispatch(&mut guard, command, &announced);
        announce_completion(&guard, &announced);
    }

    driver.stop();
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
