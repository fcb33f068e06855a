//! Core types for the stream runtime
//!
//! This module provides the fundamental types used throughout the runtime:
//! - `RuntimeError` / `RuntimeResult` - error types
//! - `BoxError` - boxed host error payload

pub mod error;

pub use error::{BoxError, RuntimeError, RuntimeResult};

pub(crate) use error::panic_message;
