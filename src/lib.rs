//! # IFC Scene
//!
//! Extracts positioned building elements from IFC files for 3D display.
//!
//! ## Features
//!
//! - Parse STEP-serialized IFC documents (IFC2x3 and IFC4 schemas)
//! - Resolve local-placement chains to absolute positions and yaw
//! - Detect the declared length unit and scale coordinates to meters
//! - Aggregate elements into per-kind, per-level summary rows
//! - Accept pre-structured element payloads produced upstream
//!
//! ## Example
//!
//! ```no_run
//! use ifc_scene::loader::load_file;
//!
//! let scene = load_file("model.ifc")?;
//! for element in &scene.elements {
//!     println!("{:?} at {:?}", element.kind, element.position);
//! }
//! # Ok::<(), ifc_scene::error::LoadError>(())
//! ```

pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod parser;
