//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Cache Cleanup: sweeps expired and over-budget entries while auto
//!   cleanup is enabled

mod cleanup;

pub use cleanup::spawn_cleanup_task;
