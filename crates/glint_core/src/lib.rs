//! glint core - binary 3D asset loading.
//!
//! This crate provides:
//!
//! - **Documents**: a tagged [`Value`] tree with a parser and writer
//! - **Containers**: `.glb` chunk splitting into document text and payload
//! - **Scene graph types**: `SceneGraph`, `Node`, `Mesh`, `Material`,
//!   `Skin`, `Animation`, resolved from a document and its payload
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{load_asset, resolve_scene};
//!
//! let (doc, blob) = load_asset("models/fox.glb")?;
//! let graph = resolve_scene(&doc, &blob)?;
//! println!("Loaded {} meshes, {} nodes", graph.meshes.len(), graph.nodes.len());
//! ```

pub mod document;
pub mod gltf;
pub mod mesh;
pub mod scene;

// Re-export commonly used types
pub use document::{parse_document, ParseError, Value, ValueError};
pub use gltf::{
    load_asset, load_scene, parse_file, read_container, resolve_scene, FormatError, LoadError,
    LoadResult,
};
pub use mesh::{Mesh, Primitive, Vertex};
pub use scene::{Animation, Image, Material, Node, Scene, SceneGraph, Skin, Texture};
