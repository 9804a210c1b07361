//! Scene resolution: document tree + binary payload → [`SceneGraph`].
//!
//! Buffer views are checked against the payload up front. Accessors are
//! decoded on demand as each entity asks for them. Once every collection is
//! built, a final pass checks all cross-references, so callers can index the
//! graph's collections without bounds checks of their own.

use glint_math::{compose_trs, Mat4, Quat, Vec3, Vec4};

use crate::document::Value;
use crate::mesh::{Mesh, Primitive, Vertex};
use crate::scene::{
    Animation, Channel, Image, ImageSource, Joint, Material, Node, PbrMetallicRoughness, Sampler,
    Scene, SceneGraph, Skin, Texture,
};

use super::loader::{LoadError, LoadResult};
use super::types::{Accessor, BufferView, ComponentType, ElementShape};

/// Build the scene graph described by `doc`, reading array data from `blob`.
///
/// Any missing key, wrong value kind or dangling index aborts the whole
/// resolution; no partial graph is returned.
pub fn resolve_scene(doc: &Value, blob: &[u8]) -> LoadResult<SceneGraph> {
    let builder = SceneBuilder::new(doc, blob)?;
    let graph = builder.build()?;
    validate(&graph)?;

    log::debug!(
        "Resolved {} scenes, {} nodes, {} meshes, {} materials, {} skins, {} animations",
        graph.scenes.len(),
        graph.nodes.len(),
        graph.meshes.len(),
        graph.materials.len(),
        graph.skins.len(),
        graph.animations.len()
    );

    Ok(graph)
}

/// A top-level array, or an empty slice when the key is absent.
fn collection<'a>(doc: &'a Value, key: &str) -> LoadResult<&'a [Value]> {
    match doc.find(key)? {
        Some(v) => Ok(v.as_array()?),
        None => Ok(&[][..]),
    }
}

fn name(value: &Value) -> LoadResult<String> {
    Ok(value
        .find("name")?
        .map(Value::as_str)
        .transpose()?
        .unwrap_or_default()
        .to_string())
}

fn optional_index(value: &Value, key: &str) -> LoadResult<Option<usize>> {
    Ok(value.find(key)?.map(Value::as_usize).transpose()?)
}

fn index_list(value: &Value, key: &str) -> LoadResult<Vec<usize>> {
    match value.find(key)? {
        Some(list) => Ok(list
            .as_array()?
            .iter()
            .map(Value::as_usize)
            .collect::<Result<_, _>>()?),
        None => Ok(Vec::new()),
    }
}

fn optional_f32(value: &Value, key: &str, default: f32) -> LoadResult<f32> {
    Ok(value.find(key)?.map(Value::as_f32).transpose()?.unwrap_or(default))
}

/// A fixed-length array of numbers, or `default` when the key is absent.
fn float_array<const N: usize>(
    value: &Value,
    field: &'static str,
    default: [f32; N],
) -> LoadResult<[f32; N]> {
    let Some(list) = value.find(field)? else {
        return Ok(default);
    };
    let items = list.as_array()?;
    if items.len() != N {
        return Err(LoadError::FieldLength {
            field,
            expected: N,
            found: items.len(),
        });
    }

    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f32()?;
    }
    Ok(out)
}

/// The `index` of a texture reference object such as `normalTexture`.
fn texture_ref(value: &Value, key: &str) -> LoadResult<Option<usize>> {
    match value.find(key)? {
        Some(info) => Ok(Some(info.get("index")?.as_usize()?)),
        None => Ok(None),
    }
}

fn decode_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn decode_u16s(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

/// Resolves entities against the document and payload.
struct SceneBuilder<'a> {
    doc: &'a Value,
    blob: &'a [u8],
    accessors: &'a [Value],
    buffer_views: Vec<BufferView>,
}

impl<'a> SceneBuilder<'a> {
    fn new(doc: &'a Value, blob: &'a [u8]) -> LoadResult<Self> {
        let buffer_views = collection(doc, "bufferViews")?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                BufferView::from_value(v, i, blob.len()).map_err(|e| e.within("bufferView", i))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        Ok(Self {
            doc,
            blob,
            accessors: collection(doc, "accessors")?,
            buffer_views,
        })
    }

    fn build(&self) -> LoadResult<SceneGraph> {
        Ok(SceneGraph {
            default_scene: optional_index(self.doc, "scene")?,
            scenes: self.resolve_all("scenes", "scene", |v| self.resolve_scene_entry(v))?,
            nodes: self.resolve_all("nodes", "node", |v| self.resolve_node(v))?,
            meshes: self.resolve_all("meshes", "mesh", |v| self.resolve_mesh(v))?,
            materials: self.resolve_all("materials", "material", |v| self.resolve_material(v))?,
            textures: self.resolve_all("textures", "texture", |v| self.resolve_texture(v))?,
            images: self.resolve_all("images", "image", |v| self.resolve_image(v))?,
            skins: self.resolve_all("skins", "skin", |v| self.resolve_skin(v))?,
            animations: self.resolve_all("animations", "animation", |v| self.resolve_animation(v))?,
        })
    }

    /// Resolve every entry of a top-level collection, tagging errors with
    /// the entry that failed.
    fn resolve_all<T>(
        &self,
        key: &str,
        kind: &'static str,
        resolve: impl Fn(&Value) -> LoadResult<T>,
    ) -> LoadResult<Vec<T>> {
        collection(self.doc, key)?
            .iter()
            .enumerate()
            .map(|(i, v)| resolve(v).map_err(|e| e.within(kind, i)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Accessor decoding
    // ------------------------------------------------------------------

    fn accessor(&self, index: usize) -> LoadResult<Accessor> {
        let value = self.accessors.get(index).ok_or(LoadError::Reference {
            kind: "accessor",
            index,
            len: self.accessors.len(),
        })?;
        Accessor::from_value(value).map_err(|e| e.within("accessor", index))
    }

    /// Payload bytes covered by an accessor.
    fn accessor_bytes(&self, index: usize, accessor: &Accessor) -> LoadResult<&'a [u8]> {
        let view = self
            .buffer_views
            .get(accessor.buffer_view)
            .ok_or(LoadError::Reference {
                kind: "bufferView",
                index: accessor.buffer_view,
                len: self.buffer_views.len(),
            })?;

        if let Some(stride) = view.byte_stride {
            if stride != accessor.element_size() {
                return Err(LoadError::Unsupported(format!(
                    "bufferView {} has byteStride {} (interleaved data)",
                    accessor.buffer_view, stride
                )));
            }
        }

        let out_of_range = |end| LoadError::ByteRange {
            what: format!("accessor {index}"),
            offset: accessor.byte_offset,
            end,
            limit: view.range.length,
        };
        let end = match accessor
            .byte_length()
            .and_then(|len| accessor.byte_offset.checked_add(len))
        {
            Some(end) if end <= view.range.length => end,
            end => return Err(out_of_range(end.unwrap_or(usize::MAX))),
        };

        // end <= view length, and the view was checked against the payload
        let start = view.range.offset + accessor.byte_offset;
        self.blob
            .get(start..view.range.offset + end)
            .ok_or_else(|| out_of_range(end))
    }

    /// Decode a float accessor, optionally requiring a specific shape.
    fn read_f32s(&self, index: usize, shape: Option<ElementShape>) -> LoadResult<(Accessor, Vec<f32>)> {
        let accessor = self.accessor(index)?;
        let shape_ok = shape.map_or(true, |s| s == accessor.shape);
        if accessor.component_type != ComponentType::Float || !shape_ok {
            return Err(LoadError::AccessorMismatch {
                index,
                expected: match shape {
                    Some(s) => format!("Float {s}"),
                    None => "Float".to_string(),
                },
                found: format!("{:?} {}", accessor.component_type, accessor.shape),
            });
        }

        let bytes = self.accessor_bytes(index, &accessor)?;
        Ok((accessor, decode_f32s(bytes)))
    }

    /// Decode an unsigned byte or short accessor, widening to `u16`.
    fn read_u16s_widened(&self, index: usize, shape: ElementShape) -> LoadResult<(Accessor, Vec<u16>)> {
        let accessor = self.accessor(index)?;
        let mismatch = || LoadError::AccessorMismatch {
            index,
            expected: format!("UnsignedByte or UnsignedShort {shape}"),
            found: format!("{:?} {}", accessor.component_type, accessor.shape),
        };
        if accessor.shape != shape {
            return Err(mismatch());
        }

        let bytes = self.accessor_bytes(index, &accessor)?;
        let values: Vec<u16> = match accessor.component_type {
            ComponentType::UnsignedByte => bytes.iter().map(|&b| u16::from(b)).collect(),
            ComponentType::UnsignedShort => decode_u16s(bytes),
            _ => return Err(mismatch()),
        };
        Ok((accessor, values))
    }

    fn read_indices(&self, index: usize) -> LoadResult<Vec<u16>> {
        let accessor = self.accessor(index)?;
        if accessor.component_type != ComponentType::UnsignedShort {
            return Err(LoadError::Unsupported(format!(
                "index accessor {} has component type {:?}, only UnsignedShort is supported",
                index, accessor.component_type
            )));
        }
        if accessor.shape != ElementShape::Scalar {
            return Err(LoadError::AccessorMismatch {
                index,
                expected: "UnsignedShort SCALAR".to_string(),
                found: format!("{:?} {}", accessor.component_type, accessor.shape),
            });
        }

        Ok(decode_u16s(self.accessor_bytes(index, &accessor)?))
    }

    // ------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------

    fn resolve_scene_entry(&self, value: &Value) -> LoadResult<Scene> {
        Ok(Scene {
            name: name(value)?,
            nodes: index_list(value, "nodes")?,
        })
    }

    fn resolve_node(&self, value: &Value) -> LoadResult<Node> {
        let transform = if value.contains_key("matrix") {
            Mat4::from_cols_array(&float_array(value, "matrix", [0.0; 16])?)
        } else {
            let translation = float_array(value, "translation", [0.0; 3])?;
            let rotation = float_array(value, "rotation", [0.0, 0.0, 0.0, 1.0])?;
            let scale = float_array(value, "scale", [1.0; 3])?;
            compose_trs(
                Vec3::from_array(translation),
                Quat::from_array(rotation),
                Vec3::from_array(scale),
            )
        };

        Ok(Node {
            name: name(value)?,
            transform,
            children: index_list(value, "children")?,
            mesh: optional_index(value, "mesh")?,
            skin: optional_index(value, "skin")?,
        })
    }

    fn resolve_mesh(&self, value: &Value) -> LoadResult<Mesh> {
        let primitives = value
            .get("primitives")?
            .as_array()?
            .iter()
            .enumerate()
            .map(|(i, p)| self.resolve_primitive(p).map_err(|e| e.within("primitive", i)))
            .collect::<LoadResult<Vec<_>>>()?;

        Ok(Mesh {
            name: name(value)?,
            primitives,
        })
    }

    fn resolve_primitive(&self, value: &Value) -> LoadResult<Primitive> {
        let attributes = value.get("attributes")?;

        let position_index = attributes.get("POSITION")?.as_usize()?;
        let (_, positions) = self.read_f32s(position_index, Some(ElementShape::Vec3))?;
        let mut vertices: Vec<Vertex> = positions
            .chunks_exact(3)
            .map(|p| Vertex {
                position: [p[0], p[1], p[2]],
                ..Default::default()
            })
            .collect();
        let vertex_count = vertices.len();

        let check_count = |attribute: &str, accessor: &Accessor| {
            if accessor.count < vertex_count {
                Err(LoadError::AttributeCount {
                    attribute: attribute.to_string(),
                    expected: vertex_count,
                    found: accessor.count,
                })
            } else {
                Ok(())
            }
        };

        for entry in attributes.iter()? {
            let attribute = entry.key.unwrap_or_default();
            let index = entry.value.as_usize()?;

            match attribute {
                "POSITION" => {}
                "NORMAL" => {
                    let (accessor, data) = self.read_f32s(index, Some(ElementShape::Vec3))?;
                    check_count(attribute, &accessor)?;
                    for (v, n) in vertices.iter_mut().zip(data.chunks_exact(3)) {
                        v.normal = [n[0], n[1], n[2]];
                    }
                }
                "TEXCOORD_0" => {
                    let (accessor, data) = self.read_f32s(index, Some(ElementShape::Vec2))?;
                    check_count(attribute, &accessor)?;
                    for (v, uv) in vertices.iter_mut().zip(data.chunks_exact(2)) {
                        v.uv = [uv[0], uv[1]];
                    }
                }
                "JOINTS_0" => {
                    let (accessor, data) = self.read_u16s_widened(index, ElementShape::Vec4)?;
                    check_count(attribute, &accessor)?;
                    for (v, j) in vertices.iter_mut().zip(data.chunks_exact(4)) {
                        v.joints = [j[0], j[1], j[2], j[3]];
                    }
                }
                "WEIGHTS_0" => {
                    let (accessor, data) = self.read_f32s(index, Some(ElementShape::Vec4))?;
                    check_count(attribute, &accessor)?;
                    for (v, w) in vertices.iter_mut().zip(data.chunks_exact(4)) {
                        v.weights = [w[0], w[1], w[2], w[3]];
                    }
                }
                other => log::warn!("Skipping unsupported vertex attribute {}", other),
            }
        }

        let indices = match optional_index(value, "indices")? {
            Some(index) => self.read_indices(index)?,
            None => Vec::new(),
        };

        Ok(Primitive::new(vertices, indices, optional_index(value, "material")?))
    }

    fn resolve_material(&self, value: &Value) -> LoadResult<Material> {
        let defaults = PbrMetallicRoughness::default();
        let pbr = match value.find("pbrMetallicRoughness")? {
            Some(block) => PbrMetallicRoughness {
                base_color_factor: Vec4::from_array(float_array(
                    block,
                    "baseColorFactor",
                    defaults.base_color_factor.to_array(),
                )?),
                base_color_texture: texture_ref(block, "baseColorTexture")?,
                metallic_factor: optional_f32(block, "metallicFactor", defaults.metallic_factor)?,
                roughness_factor: optional_f32(block, "roughnessFactor", defaults.roughness_factor)?,
                metallic_roughness_texture: texture_ref(block, "metallicRoughnessTexture")?,
            },
            None => defaults,
        };

        let fallback = Material::default();
        Ok(Material {
            name: value.find("name")?.map(Value::as_str).transpose()?.map(str::to_string),
            pbr,
            normal_texture: texture_ref(value, "normalTexture")?,
            occlusion_texture: texture_ref(value, "occlusionTexture")?,
            emissive_texture: texture_ref(value, "emissiveTexture")?,
            emissive_factor: Vec3::from_array(float_array(
                value,
                "emissiveFactor",
                fallback.emissive_factor.to_array(),
            )?),
            alpha_mode: match value.find("alphaMode")? {
                Some(mode) => mode.as_str()?.to_string(),
                None => fallback.alpha_mode,
            },
            alpha_cutoff: optional_f32(value, "alphaCutoff", fallback.alpha_cutoff)?,
            double_sided: value
                .find("doubleSided")?
                .map(Value::as_bool)
                .transpose()?
                .unwrap_or(fallback.double_sided),
        })
    }

    fn resolve_texture(&self, value: &Value) -> LoadResult<Texture> {
        Ok(Texture {
            name: name(value)?,
            source: optional_index(value, "source")?,
        })
    }

    fn resolve_image(&self, value: &Value) -> LoadResult<Image> {
        let source = match optional_index(value, "bufferView")? {
            Some(view) => {
                let view = self.buffer_views.get(view).ok_or(LoadError::Reference {
                    kind: "bufferView",
                    index: view,
                    len: self.buffer_views.len(),
                })?;
                ImageSource::View(view.range)
            }
            None => ImageSource::Uri(value.get("uri")?.as_str()?.to_string()),
        };

        Ok(Image {
            name: name(value)?,
            mime_type: value.find("mimeType")?.map(Value::as_str).transpose()?.map(str::to_string),
            source,
        })
    }

    fn resolve_skin(&self, value: &Value) -> LoadResult<Skin> {
        let joint_nodes = index_list(value, "joints")?;

        let matrices: Vec<Mat4> = match optional_index(value, "inverseBindMatrices")? {
            Some(index) => {
                let (_, data) = self.read_f32s(index, Some(ElementShape::Mat4))?;
                data.chunks_exact(16).map(Mat4::from_cols_slice).collect()
            }
            None => vec![Mat4::IDENTITY; joint_nodes.len()],
        };
        if matrices.len() < joint_nodes.len() {
            return Err(LoadError::AttributeCount {
                attribute: "inverseBindMatrices".to_string(),
                expected: joint_nodes.len(),
                found: matrices.len(),
            });
        }

        let joints = joint_nodes
            .into_iter()
            .zip(matrices)
            .map(|(node, inverse_bind_matrix)| Joint {
                node,
                inverse_bind_matrix,
            })
            .collect();

        Ok(Skin {
            name: name(value)?,
            joints,
            skeleton: optional_index(value, "skeleton")?,
        })
    }

    fn resolve_animation(&self, value: &Value) -> LoadResult<Animation> {
        let samplers = value
            .get("samplers")?
            .as_array()?
            .iter()
            .enumerate()
            .map(|(i, s)| self.resolve_sampler(s).map_err(|e| e.within("sampler", i)))
            .collect::<LoadResult<Vec<_>>>()?;

        let channels = value
            .get("channels")?
            .as_array()?
            .iter()
            .enumerate()
            .map(|(i, c)| resolve_channel(c).map_err(|e| e.within("channel", i)))
            .collect::<LoadResult<Vec<_>>>()?;

        Ok(Animation {
            name: name(value)?,
            channels,
            samplers,
        })
    }

    fn resolve_sampler(&self, value: &Value) -> LoadResult<Sampler> {
        let interpolation = match value.find("interpolation")? {
            Some(mode) => mode.as_str()?.to_string(),
            None => "LINEAR".to_string(),
        };
        let (input, times) = self.read_f32s(value.get("input")?.as_usize()?, Some(ElementShape::Scalar))?;
        let (output, values) = self.read_f32s(value.get("output")?.as_usize()?, None)?;

        // Cubic splines store in-tangent, value and out-tangent per keyframe
        let per_keyframe = if interpolation == "CUBICSPLINE" { 3 } else { 1 };
        let expected = input.count.saturating_mul(per_keyframe);
        if output.count != expected {
            return Err(LoadError::AttributeCount {
                attribute: "output".to_string(),
                expected,
                found: output.count,
            });
        }

        Ok(Sampler {
            times,
            values,
            width: output.shape.components(),
            interpolation,
        })
    }
}

fn resolve_channel(value: &Value) -> LoadResult<Channel> {
    let target = value.get("target")?;
    Ok(Channel {
        sampler: value.get("sampler")?.as_usize()?,
        node: target.get("node")?.as_usize()?,
        path: target.get("path")?.as_str()?.to_string(),
    })
}

// ----------------------------------------------------------------------
// Cross-reference validation
// ----------------------------------------------------------------------

fn check(kind: &'static str, index: usize, len: usize) -> LoadResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(LoadError::Reference { kind, index, len })
    }
}

fn check_all<'i>(
    kind: &'static str,
    indices: impl IntoIterator<Item = &'i usize>,
    len: usize,
) -> LoadResult<()> {
    indices.into_iter().try_for_each(|&i| check(kind, i, len))
}

/// Check every index stored in the graph against its target collection.
fn validate(graph: &SceneGraph) -> LoadResult<()> {
    let nodes = graph.nodes.len();

    if let Some(scene) = graph.default_scene {
        check("scene", scene, graph.scenes.len())?;
    }

    for (i, scene) in graph.scenes.iter().enumerate() {
        check_all("node", &scene.nodes, nodes).map_err(|e| e.within("scene", i))?;
    }

    for (i, node) in graph.nodes.iter().enumerate() {
        (|| -> LoadResult<()> {
            check_all("node", &node.children, nodes)?;
            check_all("mesh", &node.mesh, graph.meshes.len())?;
            check_all("skin", &node.skin, graph.skins.len())
        })()
        .map_err(|e| e.within("node", i))?;
    }

    for (i, mesh) in graph.meshes.iter().enumerate() {
        for (p, primitive) in mesh.primitives.iter().enumerate() {
            check_all("material", &primitive.material, graph.materials.len())
                .map_err(|e| e.within("primitive", p).within("mesh", i))?;
        }
    }

    for (i, material) in graph.materials.iter().enumerate() {
        material
            .texture_indices()
            .try_for_each(|t| check("texture", t, graph.textures.len()))
            .map_err(|e| e.within("material", i))?;
    }

    for (i, texture) in graph.textures.iter().enumerate() {
        check_all("image", &texture.source, graph.images.len()).map_err(|e| e.within("texture", i))?;
    }

    for (i, skin) in graph.skins.iter().enumerate() {
        (|| -> LoadResult<()> {
            skin.joints.iter().try_for_each(|j| check("node", j.node, nodes))?;
            check_all("node", &skin.skeleton, nodes)
        })()
        .map_err(|e| e.within("skin", i))?;
    }

    for (i, animation) in graph.animations.iter().enumerate() {
        for (c, channel) in animation.channels.iter().enumerate() {
            (|| -> LoadResult<()> {
                check("sampler", channel.sampler, animation.samplers.len())?;
                check("node", channel.node, nodes)
            })()
            .map_err(|e| e.within("channel", c).within("animation", i))?;
        }
    }

    Ok(())
}
