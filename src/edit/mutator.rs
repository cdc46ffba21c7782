use std::collections::HashMap;

use crate::{
    document::model::{Document, Image, Texture, TextureRef, file_name_of, file_stem_of},
    edit::sharing::{self, Sharing},
    edit::slot::TextureSlot,
    foundation::config::{EditOptions, MaterialLookup},
    foundation::error::{GlbEditError, GlbEditResult},
    storage::normalize_rel_path,
};

/// What a single slot change did to the texture graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The slot was empty; a texture was appended and bound.
    Created {
        /// Appended texture.
        texture: usize,
        /// Image the texture points at.
        image: usize,
    },
    /// The bound texture was unshared and now points at the new image.
    ReplacedInPlace {
        /// Texture that was repointed.
        texture: usize,
        /// Image it now points at.
        image: usize,
    },
    /// The bound texture was shared; the slot now points at a fresh texture.
    Forked {
        /// Texture the slot pointed at before; left untouched.
        previous: usize,
        /// Appended texture.
        texture: usize,
        /// Image the new texture points at.
        image: usize,
    },
}

impl SlotOutcome {
    /// Texture bound to the slot after the change.
    pub fn texture(self) -> usize {
        match self {
            Self::Created { texture, .. }
            | Self::ReplacedInPlace { texture, .. }
            | Self::Forked { texture, .. } => texture,
        }
    }

    /// Image behind the slot after the change.
    pub fn image(self) -> usize {
        match self {
            Self::Created { image, .. }
            | Self::ReplacedInPlace { image, .. }
            | Self::Forked { image, .. } => image,
        }
    }
}

/// State of one mutation pass over one document.
///
/// Textures and images are append-only arenas. The only reuse is the image dedup rule: an image
/// appended earlier in the same pass for the same file path (after normalization, so `a/b.png` and
/// `./a/b.png` match) is pointed at again instead of being appended twice.
#[derive(Debug, Default)]
pub struct MutationPass {
    options: EditOptions,
    images_by_path: HashMap<String, usize>,
    appended_images: Vec<usize>,
}

impl MutationPass {
    /// Fresh pass with the given policies.
    pub fn new(options: EditOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Images appended so far, in append order.
    pub fn appended_images(&self) -> &[usize] {
        &self.appended_images
    }

    /// Point `slot` of material `material_name` at the image file `image_path`.
    ///
    /// An empty slot gets a new texture; a bound texture is repointed in place when nothing else
    /// uses it or its image, and otherwise the slot is rebound to a new texture so other materials
    /// keep what they had.
    pub fn apply(
        &mut self,
        document: &mut Document,
        material_name: &str,
        slot: TextureSlot,
        image_path: &str,
    ) -> GlbEditResult<SlotOutcome> {
        let material_idx = find_material(document, material_name, self.options.material_lookup)?;
        let texture_name = file_stem_of(file_name_of(image_path)).to_string();

        let current = slot
            .read(&document.materials[material_idx])
            .map(|r| r.index);

        let outcome = match current {
            None => {
                let image = self.image_for(document, image_path);
                let texture = document.push_texture(Texture {
                    source: Some(image),
                    name: Some(texture_name),
                    ..Texture::default()
                });
                slot.bind(&mut document.materials[material_idx], TextureRef::new(texture));
                SlotOutcome::Created { texture, image }
            }
            Some(texture) => {
                if texture >= document.textures.len() {
                    return Err(GlbEditError::mutation_failed(format!(
                        "material '{material_name}' {slot} references missing texture {texture}"
                    )));
                }

                match sharing::classify(document, texture) {
                    Sharing::SafeToMutateInPlace => {
                        let image = self.image_for(document, image_path);
                        let target = &mut document.textures[texture];
                        target.source = Some(image);
                        target.name = Some(texture_name);
                        SlotOutcome::ReplacedInPlace { texture, image }
                    }
                    Sharing::MustCreateNew => {
                        let image = self.image_for(document, image_path);
                        // Sampler and extensions carry over to the fork.
                        let rest = document.textures[texture].rest.clone();
                        let new_texture = document.push_texture(Texture {
                            source: Some(image),
                            name: Some(texture_name),
                            rest,
                        });
                        if let Some(r) = slot.read_mut(&mut document.materials[material_idx]) {
                            r.index = new_texture;
                        }
                        SlotOutcome::Forked {
                            previous: texture,
                            texture: new_texture,
                            image,
                        }
                    }
                }
            }
        };

        tracing::debug!(material = material_name, %slot, ?outcome, "texture slot updated");
        Ok(outcome)
    }

    fn image_for(&mut self, document: &mut Document, path: &str) -> usize {
        let key = normalize_rel_path(path).unwrap_or_else(|_| path.to_string());
        if let Some(&idx) = self.images_by_path.get(&key) {
            return idx;
        }
        let idx = document.push_image(Image::from_file_path(path));
        self.images_by_path.insert(key, idx);
        self.appended_images.push(idx);
        idx
    }
}

/// Resolve a material name to its index.
///
/// [`MaterialLookup::FirstMatch`] returns the first material carrying the name;
/// [`MaterialLookup::Strict`] rejects names carried by more than one material.
pub fn find_material(
    document: &Document,
    name: &str,
    lookup: MaterialLookup,
) -> GlbEditResult<usize> {
    let mut matches = document.materials_named(name);
    let first = matches.next().ok_or_else(|| {
        GlbEditError::material_not_found(format!("the document has no material named '{name}'"))
    })?;
    if lookup == MaterialLookup::Strict && matches.next().is_some() {
        return Err(GlbEditError::duplicate_material(format!(
            "more than one material is named '{name}'"
        )));
    }
    Ok(first)
}

#[cfg(test)]
#[path = "../../tests/unit/edit/mutator.rs"]
mod tests;
