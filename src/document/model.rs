use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object used to carry glTF properties this crate does not model.
pub type Passthrough = Map<String, Value>;

/// The parts of a glTF document the editor reads and writes.
///
/// Everything else at the top level (`asset`, `meshes`, `nodes`, `buffers`, ...) is kept verbatim
/// in [`Document::rest`] and written back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Materials in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<Material>,
    /// Texture arena. Indices are stable; entries are only appended.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub textures: Vec<Texture>,
    /// Image arena. Indices are stable; entries are only appended.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
    /// Unmodelled top-level properties.
    #[serde(flatten)]
    pub rest: Passthrough,
}

/// A named set of rendering parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Lookup key for change requests. Not unique in malformed documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// PBR block holding base-color and metallic-roughness slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pbr_metallic_roughness: Option<PbrMetallicRoughness>,
    /// Tangent-space normal map slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_texture: Option<TextureRef>,
    /// Factors, alpha mode, other texture slots, extensions and extras.
    #[serde(flatten)]
    pub rest: Passthrough,
}

/// `pbrMetallicRoughness` block of a material.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrMetallicRoughness {
    /// Base color map slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureRef>,
    /// Metallic-roughness map slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metallic_roughness_texture: Option<TextureRef>,
    /// `baseColorFactor`, `metallicFactor`, `roughnessFactor`, extensions and extras.
    #[serde(flatten)]
    pub rest: Passthrough,
}

/// Reference from a material slot to a texture (glTF `textureInfo` / `normalTextureInfo`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRef {
    /// Index into [`Document::textures`].
    pub index: usize,
    /// UV set used for lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_coord: Option<u32>,
    /// Normal scale; only meaningful on the normal slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Extensions and extras.
    #[serde(flatten)]
    pub rest: Passthrough,
}

impl TextureRef {
    /// Bare reference to texture `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            tex_coord: None,
            scale: None,
            rest: Passthrough::new(),
        }
    }
}

/// Indirection from a material-facing reference to an image.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    /// Index into [`Document::images`]. glTF allows it to be absent when an extension supplies the
    /// image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Sampler, extensions and extras.
    #[serde(flatten)]
    pub rest: Passthrough,
}

/// Pixel data source.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// File path or `data:` URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// MIME type; required by glTF when `bufferView` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Buffer view holding embedded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    /// Extensions and extras.
    #[serde(flatten)]
    pub rest: Passthrough,
}

impl Image {
    /// File-backed image referring to `path`, named after its last path segment.
    pub fn from_file_path(path: &str) -> Self {
        Self {
            uri: Some(path.to_string()),
            name: Some(file_name_of(path).to_string()),
            ..Self::default()
        }
    }

    /// Whether the pixels live outside the document (neither a `data:` URI nor a buffer view).
    pub fn is_file_backed(&self) -> bool {
        self.buffer_view.is_none()
            && self
                .uri
                .as_deref()
                .is_some_and(|uri| !uri.starts_with("data:"))
    }
}

impl Document {
    /// Indices of all materials named `name`, in document order.
    pub fn materials_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.materials
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.name.as_deref() == Some(name))
            .map(|(i, _)| i)
    }

    /// Names carried by more than one material, sorted.
    pub fn duplicate_material_names(&self) -> Vec<&str> {
        let mut counts = std::collections::BTreeMap::<&str, usize>::new();
        for name in self.materials.iter().filter_map(|m| m.name.as_deref()) {
            *counts.entry(name).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|&(_, n)| n > 1)
            .map(|(name, _)| name)
            .collect()
    }

    /// Image index behind texture `texture_index`, if the texture exists and has a source.
    pub fn image_of(&self, texture_index: usize) -> Option<usize> {
        self.textures.get(texture_index).and_then(|t| t.source)
    }

    /// Append `texture`, returning its index.
    pub fn push_texture(&mut self, texture: Texture) -> usize {
        self.textures.push(texture);
        self.textures.len() - 1
    }

    /// Append `image`, returning its index.
    pub fn push_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }
}

/// Last `/`- or `\`-separated segment of `path`.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// `file_name` without its final extension. Dotfiles keep their full name.
pub fn file_stem_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(idx) => &file_name[..idx],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
