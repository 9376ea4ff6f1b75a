//! Core types shared across the pmsup crate.
//!
//! Currently this is the error taxonomy; see [`error`].

pub mod error;

pub use error::UpdaterError;
