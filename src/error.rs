//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `treeref` library. It uses the `thiserror` library to create an `Error`
//! enum covering the failure modes the engine can surface, with clear and
//! descriptive messages.
//!
//! The engine's contract keeps this enum deliberately small: absence of a
//! matching node is a normal, representable result and is never reported
//! through this type. What remains is misconfiguration: a selector string
//! the parser rejects, a structurally invalid tree mutation, or a deferred
//! read requested on a view that was built without a scheduler.
//!
//! - **`Error`**: the enum of all failure modes, each variant carrying the
//!   contextual fields needed to diagnose it.
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`, used
//!   throughout the library to simplify signatures.

use thiserror::Error;

/// Main error type for treeref operations
#[derive(Error, Debug)]
pub enum Error {
    /// A selector string could not be parsed.
    ///
    /// Carries the offending input verbatim and optionally a hint about how
    /// to express the query within the supported subset.
    #[error("Selector parse error: {message} in `{input}`{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Selector {
        input: String,
        message: String,
        /// Optional hint for how to rewrite the selector
        hint: Option<String>,
    },

    /// A structurally invalid tree mutation was requested, such as appending
    /// a node underneath itself or one of its own descendants.
    #[error("Tree operation error: {message}")]
    Tree { message: String },

    /// A deferred read was requested on a view constructed without a
    /// scheduler.
    #[error("Deferred access requires a scheduler; provide one via Options::with_scheduler")]
    SchedulerMissing,
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
