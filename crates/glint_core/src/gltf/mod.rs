//! Binary container loading and scene resolution.
//!
//! Only the binary container form is read: one `.glb` file holding a
//! document chunk and a single binary payload. Buffers with external URIs,
//! sparse accessors and interleaved buffer views are not supported.
//!
//! # Example
//!
//! ```ignore
//! use glint_core::gltf::load_scene;
//!
//! let graph = load_scene("models/fox.glb")?;
//! for (node, world) in graph.world_transforms(0) {
//!     println!("{}: {:?}", graph.nodes[node].name, world.w_axis);
//! }
//! ```

mod container;
mod loader;
mod resolver;
mod types;

pub use container::{
    read_container, write_container, ChunkHeader, Container, FormatError, GlbHeader,
    CHUNK_HEADER_LEN, GLTF_MAGIC, HEADER_LEN,
};
pub use loader::{load_asset, load_scene, parse_file, LoadError, LoadResult};
pub use resolver::resolve_scene;
pub use types::{Accessor, BufferView, ByteRange, ComponentType, ElementShape};
