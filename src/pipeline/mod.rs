//! Collection-and-curation pipeline.
//!
//! # Submodules
//!
//! - [`normalize`]: markup stripping, truncation and date normalization
//! - [`filter`]: promotional/short-title rejection and the trusted-source check
//! - [`aggregate`]: title deduplication and recency ordering
//! - [`curator`]: runs the adapters and stages, applies the digest cap and
//!   placeholder fallbacks

pub mod aggregate;
pub mod curator;
pub mod filter;
pub mod normalize;
