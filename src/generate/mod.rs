//! Asset generation
//!
//! Placeholder fighter sprites: one image per posture, drawn as a simple
//! silhouette, used whenever a fighter has no art of its own.

pub mod placeholders;
