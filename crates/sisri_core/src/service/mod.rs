//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads into caller-level search and catalog APIs.
//! - Keep CLI and other front ends decoupled from storage details.

pub mod catalog_service;
pub mod search_service;
