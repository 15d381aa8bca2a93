//! Application Layer
//!
//! Use cases orchestrating the domain ports.

mod collector;

pub use collector::CdrCollector;
