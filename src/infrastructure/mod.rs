//! Infrastructure Layer
//!
//! Cross-cutting concerns: shutdown coordination and the background poll
//! task.

pub mod poller;
pub mod shutdown;

pub use poller::CdrPoller;
pub use shutdown::{shutdown_signal, ShutdownController};
