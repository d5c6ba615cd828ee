//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Resolve local "today" once per call and pass it down.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod diary_service;
pub mod maintenance;
pub mod pillar_service;
pub mod reflection_service;
pub mod score_policy;
pub mod score_service;
