use crate::{
    document::model::{Document, Material},
    edit::merge::merge_material,
    edit::mutator::{MutationPass, SlotOutcome, find_material},
    edit::slot::{TextureSlot, slots_for_fragment},
    foundation::config::EditOptions,
    foundation::error::{GlbEditError, GlbEditResult},
    request::{MaterialChange, TextureFileChange},
    storage::Storage,
};

/// One applied texture slot change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotChange {
    /// Texture file the slot now shows.
    pub texture_file: String,
    /// Material that was edited.
    pub material: String,
    /// Slot that was edited.
    pub slot: TextureSlot,
    /// What happened to the texture graph.
    pub outcome: SlotOutcome,
}

/// Summary of a texture-change pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Slot changes in the order they were applied.
    pub changes: Vec<SlotChange>,
    /// Images appended by the pass; these are the ones to embed.
    pub appended_images: Vec<usize>,
}

/// Merge every change entry into the materials it names.
///
/// All materials carrying a requested name are merged, each with the first entry naming it.
/// Materials are only replaced once every merge has succeeded, so a failing request leaves the
/// document as it was. A texture reference changed by a merge must name an existing texture.
/// Returns the number of materials replaced.
pub fn apply_parameter_changes(
    document: &mut Document,
    changes: &[MaterialChange],
    options: EditOptions,
) -> GlbEditResult<usize> {
    for change in changes {
        // Surfaces unknown names, and duplicates under strict lookup.
        find_material(document, &change.name, options.material_lookup)?;
    }

    let mut merged = document.materials.clone();
    let mut replaced = 0usize;
    for material in merged.iter_mut() {
        let Some(name) = material.name.as_deref() else {
            continue;
        };
        let Some(change) = changes.iter().find(|c| c.name == name) else {
            continue;
        };
        let updated = merge_material(material, &change.fragment, options.unknown_fields)?;
        check_texture_refs(material, &updated, document.textures.len())?;
        *material = updated;
        replaced += 1;
        tracing::debug!(material = %change.name, "material parameters merged");
    }

    document.materials = merged;
    Ok(replaced)
}

/// Texture-info properties outside the three editable slots.
const OTHER_TEXTURE_KEYS: [&str; 2] = ["occlusionTexture", "emissiveTexture"];

fn texture_refs(material: &Material) -> Vec<(&'static str, u64)> {
    let slots = TextureSlot::ALL
        .iter()
        .filter_map(|slot| Some((slot.key(), slot.read(material)?.index as u64)));
    let others = OTHER_TEXTURE_KEYS.iter().filter_map(|&key| {
        let index = material.rest.get(key)?.get("index")?.as_u64()?;
        Some((key, index))
    });
    slots.chain(others).collect()
}

/// Reject references `updated` points at a missing texture, unless `before` already did.
fn check_texture_refs(
    before: &Material,
    updated: &Material,
    texture_count: usize,
) -> GlbEditResult<()> {
    let unchanged = texture_refs(before);
    for (key, index) in texture_refs(updated) {
        if index < texture_count as u64 || unchanged.contains(&(key, index)) {
            continue;
        }
        return Err(GlbEditError::invalid_request(format!(
            "material '{}': {key}.index {index} does not name a texture (the document has {texture_count})",
            updated.name.as_deref().unwrap_or("<unnamed>")
        )));
    }
    Ok(())
}

/// Apply texture changes in request order.
///
/// Each file must exist in `storage`. For every material entry of a file, the slots selected by
/// its fragment are pointed at that file. Later entries see the textures and images appended by
/// earlier ones.
pub fn apply_texture_changes<S>(
    document: &mut Document,
    files: &[TextureFileChange],
    storage: &S,
    options: EditOptions,
) -> GlbEditResult<AssemblyReport>
where
    S: Storage + ?Sized,
{
    let mut pass = MutationPass::new(options);
    let mut changes = Vec::new();

    for file in files {
        if !storage.texture_exists(&file.texture_file_path) {
            return Err(GlbEditError::texture_not_found(&file.texture_file_path));
        }

        for entry in &file.materials {
            for slot in slots_for_fragment(&entry.fragment)? {
                let outcome = pass.apply(document, &entry.name, slot, &file.texture_file_path)?;
                changes.push(SlotChange {
                    texture_file: file.texture_file_path.clone(),
                    material: entry.name.clone(),
                    slot,
                    outcome,
                });
            }
        }
    }

    Ok(AssemblyReport {
        changes,
        appended_images: pass.appended_images().to_vec(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/edit/assembler.rs"]
mod tests;
