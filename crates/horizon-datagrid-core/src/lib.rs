//! Horizon DataGrid Core - foundational systems for the data-grid engine.
//!
//! This crate provides the plumbing the grid engine is built on:
//!
//! - [`Signal`] - a type-safe signal/slot mechanism for change notifications
//! - [`CoreError`] - error types shared across the workspace
//! - [`logging`] - tracing target conventions for log filtering
//!
//! The grid engine is single-threaded and cooperative: every entry point
//! runs synchronously on the caller's thread, so signals here invoke their
//! slots directly at the emit site. There is no event loop and no queued
//! delivery.

pub mod error;
pub mod logging;
pub mod signal;

pub use error::{CoreError, Result, SignalError};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
