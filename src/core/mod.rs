//! Core XML scanning primitives
//!
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Entities: lenient entity decoding with Cow (zero-copy when possible)
//! - Span: byte ranges into the input
//! - Walker: single pass reporting the document as tree events

pub mod entities;
pub mod scanner;
pub mod span;
pub mod walker;
