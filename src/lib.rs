//! A personal finance tracker backed by JSON documents in a local data
//! directory.
//!
//! The [`Store`] owns the persisted income and expense collections plus the
//! category registry, and the [`report`] module computes date-windowed
//! aggregations over them. The `fintrack` binary is a thin CLI over these.

pub mod args;
pub mod commands;
pub mod export;
pub mod model;
pub mod report;

mod error;
mod home;
mod store;

pub use error::{Error, Result};
pub use home::Home;
pub use store::{Entry, Store};
