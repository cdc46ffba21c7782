use crate::{document::model::Document, edit::slot::TextureSlot};

/// Mutation strategy for a bound texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sharing {
    /// Only one material uses the texture and only one texture uses its image.
    SafeToMutateInPlace,
    /// An in-place edit would leak into other materials.
    MustCreateNew,
}

/// Reference counts behind a [`Sharing`] decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureUsage {
    /// Textures whose `source` is the same image as the inspected texture's.
    pub textures_sharing_image: usize,
    /// Materials with at least one slot bound to the inspected texture.
    pub materials_using_texture: usize,
}

impl TextureUsage {
    /// Strategy implied by these counts.
    pub fn sharing(self) -> Sharing {
        if self.textures_sharing_image > 1 || self.materials_using_texture > 1 {
            Sharing::MustCreateNew
        } else {
            Sharing::SafeToMutateInPlace
        }
    }
}

/// Count references to `texture_index` and to its image in the current document state.
pub fn usage(document: &Document, texture_index: usize) -> TextureUsage {
    let textures_sharing_image = match document.image_of(texture_index) {
        Some(image) => document
            .textures
            .iter()
            .filter(|t| t.source == Some(image))
            .count(),
        None => 0,
    };

    let materials_using_texture = document
        .materials
        .iter()
        .filter(|m| {
            TextureSlot::ALL
                .iter()
                .any(|slot| slot.resolves_to(m, texture_index))
        })
        .count();

    TextureUsage {
        textures_sharing_image,
        materials_using_texture,
    }
}

/// Classify `texture_index` for mutation.
pub fn classify(document: &Document, texture_index: usize) -> Sharing {
    usage(document, texture_index).sharing()
}

#[cfg(test)]
#[path = "../../tests/unit/edit/sharing.rs"]
mod tests;
