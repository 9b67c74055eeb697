//! Core 2-D soft-blob physics library.
//!
//! Main components:
//! - [`simulation`]: orchestrator owning the blobs and the tick.
//! - [`phases`]: per-blob pipeline stages run by each tick.
//! - [`blob`]: blob state, split into kinematics, boundary, and behaviour records.
//! - [`collision`]: anti-clustering (brute force or spatial hash).
//! - [`spatial_hash`]: uniform grid over blob centers.
//! - [`spring`]: mass-spring-damper model for boundary radii.
//! - [`gaussian`]: circular Gaussian smoothing of boundary radii.
//! - [`deformation`]: deformation and smoothing strategies.
//! - [`force_buffer`]: per-tick accumulated repulsion corrections.
//! - [`hull`]: convex hull of an outline.
//! - [`path`]: smooth closed curve / SVG path per blob.
//! - [`snapshot`]: serializable frame view.
//! - [`config`]: simulation parameters and validation.
//! - [`rng`]: seeded random number generator.
//! - [`types`]: shared type aliases and IDs.

pub mod blob;
pub mod collision;
pub mod config;
pub mod deformation;
pub mod force_buffer;
pub mod gaussian;
pub mod hull;
pub mod path;
pub mod phases;
pub mod rng;
pub mod simulation;
pub mod snapshot;
pub mod spatial_hash;
pub mod spring;
pub mod types;

pub use config::{SimConfig, SimConfigError};
pub use simulation::Simulation;
