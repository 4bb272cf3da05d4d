//! Digest delivery.
//!
//! The curator's job ends with a [`crate::models::Digest`]; delivery formats
//! it for a messaging webhook and reports plain success or failure. Nothing
//! here retries.

pub mod slack;
