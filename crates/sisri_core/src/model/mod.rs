//! Domain model for disaster-impact reporting.
//!
//! # Responsibility
//! - `entities`: typed rows and joined graphs returned by the store.
//! - `projection`: the canonical report shape returned to callers.
//!
//! # Invariants
//! - Store output is mapped into `projection` types before any filtering runs.

pub mod entities;
pub mod projection;
