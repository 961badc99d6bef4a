use std::fmt;

use quiz_core::model::{Answer, CardId, QuestionKind};

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(CardId),
    Close,
    Countdown(CardId),
    Answer(CardId, AnswerInput),
    Toggle(CardId, usize),
    Submit(CardId),
    Status,
    Reset,
    Help,
    Quit,
}

/// Answer as typed, before it is matched to the card's question kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerInput {
    Options(Vec<usize>),
    Verdict(bool),
}

impl AnswerInput {
    /// Shapes the input for a question of `kind`, or `None` if it cannot fit.
    #[must_use]
    pub fn into_answer(self, kind: QuestionKind) -> Option<Answer> {
        match (kind, self) {
            (QuestionKind::SingleChoice, AnswerInput::Options(options)) if options.len() == 1 => {
                Some(Answer::Choice(options[0]))
            }
            (QuestionKind::MultiChoice, AnswerInput::Options(options)) => {
                Some(Answer::choices(options))
            }
            (QuestionKind::FreeResponse, AnswerInput::Verdict(verdict)) => {
                Some(Answer::Verdict(verdict))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    UnknownCommand(String),
    MissingArgument { command: &'static str },
    InvalidCardId(String),
    InvalidOption(String),
    InvalidAnswer(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ParseError::MissingArgument { command } => {
                write!(f, "{command} needs more arguments (try `help`)")
            }
            ParseError::InvalidCardId(raw) => write!(f, "invalid card number: {raw}"),
            ParseError::InvalidOption(raw) => write!(f, "invalid option letter: {raw}"),
            ParseError::InvalidAnswer(raw) => write!(f, "invalid answer: {raw}"),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
commands:
  open N            open card N
  close             close the open card
  countdown N       start the countdown on card N
  answer N A        answer with option letter A (single-choice)
  answer N A,C      answer with several letters (multi-choice)
  answer N yes|no   moderator verdict (free-response)
  toggle N A        toggle option A of a multi-choice card
  submit N          submit the toggled options
  status            show progress
  reset             start over
  quit";

pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "open" | "o" => Command::Open(card_arg(words.next(), "open")?),
        "close" | "c" => Command::Close,
        "countdown" | "timer" => Command::Countdown(card_arg(words.next(), "countdown")?),
        "answer" | "a" => {
            let id = card_arg(words.next(), "answer")?;
            let raw = words
                .next()
                .ok_or(ParseError::MissingArgument { command: "answer" })?;
            Command::Answer(id, parse_answer(raw)?)
        }
        "toggle" | "t" => {
            let id = card_arg(words.next(), "toggle")?;
            let raw = words
                .next()
                .ok_or(ParseError::MissingArgument { command: "toggle" })?;
            Command::Toggle(id, parse_option(raw)?)
        }
        "submit" | "s" => Command::Submit(card_arg(words.next(), "submit")?),
        "status" => Command::Status,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(command)
}

fn card_arg(raw: Option<&str>, command: &'static str) -> Result<CardId, ParseError> {
    let raw = raw.ok_or(ParseError::MissingArgument { command })?;
    raw.parse()
        .map_err(|_| ParseError::InvalidCardId(raw.to_string()))
}

fn parse_option(raw: &str) -> Result<usize, ParseError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            Ok(usize::from(letter.to_ascii_lowercase() as u8 - b'a'))
        }
        _ => Err(ParseError::InvalidOption(raw.to_string())),
    }
}

fn parse_answer(raw: &str) -> Result<AnswerInput, ParseError> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "correct" => return Ok(AnswerInput::Verdict(true)),
        "no" | "n" | "false" | "wrong" => return Ok(AnswerInput::Verdict(false)),
        _ => {}
    }

    raw.split(',')
        .filter(|part| !part.is_empty())
        .map(parse_option)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ParseError::InvalidAnswer(raw.to_string()))
        .and_then(|options| {
            if options.is_empty() {
                Err(ParseError::InvalidAnswer(raw.to_string()))
            } else {
                Ok(AnswerInput::Options(options))
            }
        })
}

/// Letter shown next to option `index`.
#[must_use]
pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'A'.checked_add(i))
        .map_or('?', char::from)
}
