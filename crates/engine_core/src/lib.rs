//! Core engine types for the tactical map client.
//!
//! This crate provides the foundational types used across all systems:
//! - Frame clock and game time
//! - Transform and spatial helpers
//! - Common component types for ECS

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Vec2, Vec3};
pub use hecs::{Entity, World};
