use serde_json::{Map, Value};

use crate::{
    document::model::{Material, PbrMetallicRoughness, TextureRef},
    foundation::error::{GlbEditError, GlbEditResult},
};

/// One of the three texture binding points on a material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// `pbrMetallicRoughness.baseColorTexture`
    BaseColor,
    /// `pbrMetallicRoughness.metallicRoughnessTexture`
    MetallicRoughness,
    /// `normalTexture`
    Normal,
}

impl TextureSlot {
    /// All slots, in the order they are applied.
    pub const ALL: [TextureSlot; 3] = [Self::BaseColor, Self::MetallicRoughness, Self::Normal];

    /// glTF property name of the slot.
    pub fn key(self) -> &'static str {
        match self {
            Self::BaseColor => "baseColorTexture",
            Self::MetallicRoughness => "metallicRoughnessTexture",
            Self::Normal => "normalTexture",
        }
    }

    /// Current reference in this slot, if bound.
    pub fn read(self, material: &Material) -> Option<&TextureRef> {
        match self {
            Self::BaseColor => material
                .pbr_metallic_roughness
                .as_ref()
                .and_then(|pbr| pbr.base_color_texture.as_ref()),
            Self::MetallicRoughness => material
                .pbr_metallic_roughness
                .as_ref()
                .and_then(|pbr| pbr.metallic_roughness_texture.as_ref()),
            Self::Normal => material.normal_texture.as_ref(),
        }
    }

    /// Mutable access to the current reference in this slot.
    pub fn read_mut(self, material: &mut Material) -> Option<&mut TextureRef> {
        match self {
            Self::BaseColor => material
                .pbr_metallic_roughness
                .as_mut()
                .and_then(|pbr| pbr.base_color_texture.as_mut()),
            Self::MetallicRoughness => material
                .pbr_metallic_roughness
                .as_mut()
                .and_then(|pbr| pbr.metallic_roughness_texture.as_mut()),
            Self::Normal => material.normal_texture.as_mut(),
        }
    }

    /// Put `texture_ref` into this slot, creating an empty `pbrMetallicRoughness` block first if
    /// the slot lives in one and the material has none. An existing block is kept as-is.
    pub fn bind(self, material: &mut Material, texture_ref: TextureRef) {
        match self {
            Self::BaseColor => {
                pbr_block(material).base_color_texture = Some(texture_ref);
            }
            Self::MetallicRoughness => {
                pbr_block(material).metallic_roughness_texture = Some(texture_ref);
            }
            Self::Normal => material.normal_texture = Some(texture_ref),
        }
    }

    /// Whether this slot on `material` resolves to texture `texture_index`.
    pub fn resolves_to(self, material: &Material, texture_index: usize) -> bool {
        self.read(material).is_some_and(|r| r.index == texture_index)
    }
}

impl std::fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

fn pbr_block(material: &mut Material) -> &mut PbrMetallicRoughness {
    material
        .pbr_metallic_roughness
        .get_or_insert_with(PbrMetallicRoughness::default)
}

/// Decide which slots a texture-change fragment targets.
///
/// A `pbrMetallicRoughness` object must name `baseColorTexture` and/or `metallicRoughnessTexture`
/// as objects; a `normalTexture` object selects the normal slot. A fragment that selects nothing
/// is rejected.
pub fn slots_for_fragment(fragment: &Map<String, Value>) -> GlbEditResult<Vec<TextureSlot>> {
    let mut slots = Vec::with_capacity(3);

    match fragment.get("pbrMetallicRoughness") {
        None | Some(Value::Null) => {}
        Some(Value::Object(pbr)) => {
            for slot in [TextureSlot::BaseColor, TextureSlot::MetallicRoughness] {
                if pbr.get(slot.key()).is_some_and(Value::is_object) {
                    slots.push(slot);
                }
            }
            if slots.is_empty() {
                return Err(GlbEditError::unsupported_slot(
                    "pbrMetallicRoughness must name the texture to change: \
                     baseColorTexture and/or metallicRoughnessTexture",
                ));
            }
        }
        Some(_) => {
            return Err(GlbEditError::unsupported_slot(
                "pbrMetallicRoughness must be an object",
            ));
        }
    }

    if fragment
        .get(TextureSlot::Normal.key())
        .is_some_and(Value::is_object)
    {
        slots.push(TextureSlot::Normal);
    }

    if slots.is_empty() {
        return Err(GlbEditError::unsupported_slot(
            "no texture slot requested; supported slots are baseColorTexture, \
             metallicRoughnessTexture and normalTexture",
        ));
    }
    Ok(slots)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/slot.rs"]
mod tests;
