//! Scene graph types for glint.
//!
//! All cross-references between entities are indices into the collections
//! of [`SceneGraph`]. The resolver checks every index before handing the
//! graph back, so lookups through these indices are in bounds.

use glint_math::{Bounds, Mat4, Mat4Ext, Vec3, Vec4};

use crate::gltf::ByteRange;
use crate::mesh::Mesh;

/// A named list of root nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub name: String,
    pub nodes: Vec<usize>,
}

/// A node in the transform hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: String,

    /// Local transform relative to the parent node
    pub transform: Mat4,

    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Mat4::IDENTITY,
            children: Vec::new(),
            mesh: None,
            skin: None,
        }
    }
}

/// Metallic-roughness parameter block of a material.
#[derive(Clone, Debug, PartialEq)]
pub struct PbrMetallicRoughness {
    pub base_color_factor: Vec4,
    pub base_color_texture: Option<usize>,
    pub metallic_factor: f32,
    pub roughness_factor: f32,
    pub metallic_roughness_texture: Option<usize>,
}

impl Default for PbrMetallicRoughness {
    fn default() -> Self {
        Self {
            base_color_factor: Vec4::ONE, // Opaque white
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            metallic_roughness_texture: None,
        }
    }
}

/// A PBR material. Texture fields index `SceneGraph::textures`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub pbr: PbrMetallicRoughness,
    pub normal_texture: Option<usize>,
    pub occlusion_texture: Option<usize>,
    pub emissive_texture: Option<usize>,
    pub emissive_factor: Vec3,

    /// `"OPAQUE"`, `"MASK"` or `"BLEND"`, kept verbatim
    pub alpha_mode: String,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            pbr: PbrMetallicRoughness::default(),
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: Vec3::ZERO,
            alpha_mode: "OPAQUE".to_string(),
            alpha_cutoff: 0.5,
            double_sided: false,
        }
    }
}

impl Material {
    /// Every texture index this material refers to.
    pub fn texture_indices(&self) -> impl Iterator<Item = usize> + '_ {
        [
            self.pbr.base_color_texture,
            self.pbr.metallic_roughness_texture,
            self.normal_texture,
            self.occlusion_texture,
            self.emissive_texture,
        ]
        .into_iter()
        .flatten()
    }

    pub fn is_emissive(&self) -> bool {
        self.emissive_factor.length_squared() > 0.0 || self.emissive_texture.is_some()
    }
}

/// A texture: an image plus (ignored) sampling state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Texture {
    pub name: String,
    /// Index into `SceneGraph::images`
    pub source: Option<usize>,
}

/// Where an image's encoded bytes live.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// A range of the binary payload
    View(ByteRange),
    /// An external or data URI, not fetched
    Uri(String),
}

/// An encoded image. Pixel data is never decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub name: String,
    pub mime_type: Option<String>,
    pub source: ImageSource,
}

impl Image {
    /// Borrow the encoded bytes from the payload the graph was resolved from.
    ///
    /// Returns `None` for URI images or if `blob` is not that payload.
    pub fn data<'a>(&self, blob: &'a [u8]) -> Option<&'a [u8]> {
        match &self.source {
            ImageSource::View(range) => range.slice(blob),
            ImageSource::Uri(_) => None,
        }
    }
}

/// A skin joint: a node plus its inverse bind matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Joint {
    pub node: usize,
    pub inverse_bind_matrix: Mat4,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skin {
    pub name: String,
    pub joints: Vec<Joint>,
    pub skeleton: Option<usize>,
}

/// Binds a sampler to a node property.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    /// Index into `Animation::samplers`
    pub sampler: usize,
    pub node: usize,
    /// `"translation"`, `"rotation"`, `"scale"` or `"weights"`, kept verbatim
    pub path: String,
}

/// Keyframe times plus flat keyframe values.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampler {
    pub times: Vec<f32>,
    /// `times.len() * width` floats, three times that for `"CUBICSPLINE"`
    pub values: Vec<f32>,
    /// Floats per keyframe value
    pub width: usize,
    pub interpolation: String,
}

impl Sampler {
    pub fn keyframe_count(&self) -> usize {
        self.times.len()
    }

    /// Output element `index`, `width` floats long. For `"CUBICSPLINE"`
    /// each keyframe spans three elements: in-tangent, value, out-tangent.
    pub fn value(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.width)?;
        self.values.get(start..start.checked_add(self.width)?)
    }

    /// Time span covered by the keyframes.
    pub fn duration(&self) -> f32 {
        match (self.times.first(), self.times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub name: String,
    pub channels: Vec<Channel>,
    pub samplers: Vec<Sampler>,
}

/// A fully resolved asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
    /// Index of the scene to show by default
    pub default_scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub images: Vec<Image>,
    pub skins: Vec<Skin>,
    pub animations: Vec<Animation>,
}

impl SceneGraph {
    /// The default scene, or the first scene if none is marked default.
    pub fn active_scene(&self) -> Option<usize> {
        self.default_scene
            .or(if self.scenes.is_empty() { None } else { Some(0) })
    }

    /// World transform of every node reachable from `scene`, in depth-first
    /// order. Returns an empty list for an unknown scene.
    ///
    /// A node reached a second time (a cycle or a node with two parents) is
    /// skipped with a warning.
    pub fn world_transforms(&self, scene: usize) -> Vec<(usize, Mat4)> {
        let Some(scene) = self.scenes.get(scene) else {
            return Vec::new();
        };

        let mut visited = vec![false; self.nodes.len()];
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, Mat4)> = scene
            .nodes
            .iter()
            .rev()
            .map(|&root| (root, Mat4::IDENTITY))
            .collect();

        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            if std::mem::replace(&mut visited[index], true) {
                log::warn!("Node {} reached more than once, skipping", index);
                continue;
            }

            let world = parent * node.transform;
            out.push((index, world));
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }

        out
    }

    /// World-space bounds of every mesh instanced in `scene`.
    pub fn world_bounds(&self, scene: usize) -> Bounds {
        self.world_transforms(scene)
            .into_iter()
            .filter_map(|(index, world)| {
                let mesh = self.meshes.get(self.nodes[index].mesh?)?;
                Some(world.transform_bounds(&mesh.bounds()))
            })
            .fold(Bounds::EMPTY, |acc, b| acc.union(&b))
    }

    /// Total triangle count across every mesh instanced in `scene`.
    pub fn total_triangle_count(&self, scene: usize) -> usize {
        self.world_transforms(scene)
            .into_iter()
            .filter_map(|(index, _)| self.meshes.get(self.nodes[index].mesh?))
            .map(Mesh::triangle_count)
            .sum()
    }
}
