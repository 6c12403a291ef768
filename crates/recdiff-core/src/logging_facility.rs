//! Structured logging for recdiff binaries and tests
//!
//! `init` installs a stderr subscriber for a [`Profile`]. The
//! `log_op_start!`/`log_op_end!`/`log_op_error!` macros give every operation
//! the same `component`/`op`/`event` fields, and `init_test_capture` collects
//! events in memory for assertions.
//!
//! The differ never logs directly. It reports to a
//! [`crate::observe::DiffObserver`], and the default
//! [`crate::observe::TracingObserver`] logs through the macros here.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
