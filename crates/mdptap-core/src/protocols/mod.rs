//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `scanner`: frame boundary detection over a stream buffer
//! - `error`: explicit, actionable errors
//!
//! Decoders are pure and contain no I/O; sources and the stream driver handle
//! reads and aggregation.

pub(crate) mod common;
pub mod mdp;
