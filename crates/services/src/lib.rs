#![forbid(unsafe_code)]

pub mod controller;
pub mod driver;
pub mod error;
pub mod questions;
pub mod settings;
pub mod timers;

pub use quiz_core::Clock;

pub use controller::{CardController, CardStage, ControllerEvent};
pub use driver::{DriverHandle, spawn_driver};
pub use error::{QuestionLoadError, SettingsError};
pub use questions::{load_questions_from_path, load_questions_from_str};
pub use settings::TimingSettings;
pub use timers::{TimerHandle, TimerKind, TimerQueue};
