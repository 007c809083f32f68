//! # confgraph-error
//!
//! Unified error handling for confgraph.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what error occurred (e.g., Malformed, NonZeroExit)
//! - **Error Context**: Assist in locating the cause with rich context
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use confgraph_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::Malformed, "unexpected token")
//!         .with_operation("yaml::parse")
//!         .with_context("path", "config/app.yaml")
//!         .with_context("line", "42"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, confgraph_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using confgraph Error
pub type Result<T> = std::result::Result<T, Error>;
