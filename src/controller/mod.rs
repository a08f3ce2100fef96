//! API Controller modules
//!
//! Thin endpoints over the reconciler, organized by domain.

pub mod admin;
pub mod market;
pub mod misc;
pub mod proposals;
