//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Normalize caller input before it reaches persistence.
//! - Emit metadata-only `event=... module=service` log lines.

pub mod catalog_service;
pub mod customer_service;
pub mod order_service;
