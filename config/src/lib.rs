//! # Config Crate
//!
//! Centralized configuration constants for the isosurface pipeline.
//! Cube topology sizes, mesh file layout values and the tunables of the
//! extraction engine live here so every crate agrees on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GlobalConfig, CORNER_COUNT, EDGE_COUNT};
//!
//! assert_eq!(CORNER_COUNT, 8);
//! assert_eq!(EDGE_COUNT, 12);
//!
//! let cfg = GlobalConfig::default();
//! assert!(!cfg.parallel);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Validated Config**: Runtime settings go through `GlobalConfig::new`

pub mod constants;

#[cfg(test)]
mod tests;
