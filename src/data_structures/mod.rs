//! Scene data structures: transforms, materials, the scene graph and textures.
//!
//! - `instance` holds per-node transforms and their packed GPU form
//! - `material` contains the shared matcap material
//! - `scene_graph` enables hierarchical scene organization
//! - `texture` contains GPU texture wrapper and creation utilities

pub mod instance;
pub mod material;
pub mod scene_graph;
pub mod texture;
