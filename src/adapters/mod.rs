//! Outbound adapters implementing the application's port traits.

pub mod log_sink;

pub use log_sink::LogEventSink;
