//! Recorded capture sources.
//!
//! A capture is the byte stream read from the device link, stored either as
//! raw binary or as hex text. Both are replayed in fixed-size chunks so the
//! driver sees the same kind of arbitrary splits a live link produces.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use parser::{CaptureFileSource, CaptureFormat, ReaderSource};
