//! Observability for the storage layer
//!
//! Structured JSON logging, one line per event, synchronous and
//! unbuffered. Logging is read-only: it never influences storage
//! behavior.

mod logger;

pub use logger::{Logger, Severity};
