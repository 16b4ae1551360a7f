//! Utilities.

mod request_on_panic;

pub use self::request_on_panic::RequestOnPanic;
