//! Shared utilities.

pub mod date;
pub mod exec;
pub mod path;
mod plural;

pub use plural::{plural_count, plural_s};
