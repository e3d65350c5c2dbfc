//! Canonical text layer for copy detection.
//!
//! Turns a raw post body (plain text or editor HTML) into the deterministic,
//! versioned plain text that text shingling runs over.
//!
//! ## What we do
//!
//! - Markup stripping: tags, comments, `<script>`/`<style>` bodies, entities
//! - Unicode normalization (NFKC by default, configurable)
//! - Lowercasing and punctuation removal
//! - Whitespace normalization (collapses to single spaces)
//! - Tokenization with byte offsets
//! - SHA-256 content hashes for cache keys
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no OS/locale dependence. Same text and config give
//! the same result on any machine. Normalization never fails: garbage in
//! yields an empty or short string, which downstream shingling reports as
//! insufficient signal.

mod config;
mod error;
mod hash;
mod markup;
mod pipeline;
mod token;

pub use crate::config::CanonicalizeConfig;
pub use crate::error::CanonicalError;
pub use crate::hash::{hash_bytes, hash_reader, hash_text};
pub use crate::markup::strip_markup;
pub use crate::pipeline::{normalize, normalize_with, normalize_with_tokens};
pub use crate::token::Token;
