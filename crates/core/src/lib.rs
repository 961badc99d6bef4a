#![forbid(unsafe_code)]

pub mod data;
pub mod model;
pub mod store;
pub mod time;

pub use store::{
    IgnoreReason, Observer, Scored, SessionError, SessionSnapshot, SessionStore, SubscriptionId,
    Transition,
};
pub use time::Clock;
