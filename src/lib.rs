//! OceanTracer procedural ocean renderer
//!
//! Raymarches a sum-of-waves height field inside a bounded volume, reflects
//! the analytic sky off the surface, and renders progressively over 16x16
//! tiles in parallel.
//! Outputs PNG and EXR formats with optional TEV viewer integration.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod maths;
pub mod interval;
pub mod ray;
pub mod bbox;
pub mod ocean;
pub mod sky;
pub mod scene;
pub mod random;
pub mod camera;
pub mod tile;
pub mod render;
pub mod session;
pub mod config;
pub mod output;
