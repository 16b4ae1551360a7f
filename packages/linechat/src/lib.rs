//! Two-way line chat over UDP.
//!
//! Operator lines flow keyboard -> send queue -> transport, and datagrams flow transport ->
//! display queue -> screen. Each direction is a producer thread and a consumer thread sharing
//! one [`Queue`]. Seeing the `!\n` sentinel in either direction shuts the whole
//! [`Session`](session::Session) down.

#[macro_use]
extern crate tracing;

pub extern crate bytes;

mod queue;
pub mod util;
pub mod message;
pub mod shutdown;
pub mod pipeline;
pub mod transport;
pub mod console;
pub mod config;
pub mod session;

#[cfg(test)]
mod testing;

pub use crate::{
    queue::api::*,
    message::Message,
    shutdown::{Shutdown, ShutdownCause, ShutdownState},
    session::{Session, Report},
    config::ChatConfig,
};

/// Error types
pub mod error {
    pub use crate::queue::error::*;
    pub use crate::transport::SetupError;
    pub use crate::config::ConfigError;
}
