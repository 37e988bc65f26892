//! The send dispatcher: one state machine over three delivery mechanisms.

pub mod config;
mod delivery;
pub mod dispatcher;
pub mod error;
pub mod selection;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, ToolAvailability, SEND_INCOMPLETE};
pub use error::DispatchError;
