//! Codecs for patch operations.

pub mod json;
