//! Report search building blocks.
//!
//! # Responsibility
//! - Request parsing, shaping, filter cascades and response envelopes.
//! - Mode dispatch lives in `service::search_service`.

pub mod damage;
pub mod error;
pub mod filters;
pub mod notifications;
pub mod request;
pub mod response;
pub mod shape;
pub mod synonyms;
pub mod text;
