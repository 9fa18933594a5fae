//! Tracing and logging setup shared by catalog binaries.

pub mod tracing;

pub use self::tracing::{LogFormat, LogSettings, UnknownLogFormat, init};
