//! Foundational types shared by every oktaeder crate.
//!
//! - [`errors`]: the [`OktaederError`] type and [`Result`] alias
//! - [`binary_writer`]: growable little-endian byte writer used for GPU uploads
//! - [`mapping`]: insertion-ordered deduplication table

pub mod binary_writer;
pub mod errors;
pub mod mapping;

pub use binary_writer::BinaryWriter;
pub use errors::{OktaederError, Result};
pub use mapping::{ByAddress, Mapping};
