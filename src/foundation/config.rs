use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::GlbEditResult;

/// Default directory holding source glTF/GLB files.
pub const DEFAULT_SOURCE_DIR: &str = "data/sources";

/// Default directory receiving edited files.
pub const DEFAULT_RESULTS_DIR: &str = "data/results";

/// Default directory holding replacement texture images.
pub const DEFAULT_TEXTURES_DIR: &str = "data/textures";

/// What to do with an override key the material does not already have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnknownFieldPolicy {
    /// Fail with `UnknownField`.
    #[default]
    Reject,
    /// Insert the override value as-is.
    Insert,
}

/// How a material name from a request resolves against the document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialLookup {
    /// The first material carrying the name wins; duplicates are tolerated.
    #[default]
    FirstMatch,
    /// Duplicate names fail with `DuplicateMaterialName`.
    Strict,
}

/// Policies applied while mutating one document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditOptions {
    /// Unknown override keys.
    pub unknown_fields: UnknownFieldPolicy,
    /// Material name resolution.
    pub material_lookup: MaterialLookup,
}

/// Editor configuration, passed explicitly to storage and service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Root for request `sourcePath` values.
    pub source_dir: PathBuf,
    /// Root for request `resultPath` values.
    pub results_dir: PathBuf,
    /// Root for `textureFilePath` values.
    pub textures_dir: PathBuf,
    /// Unknown override keys.
    pub unknown_fields: UnknownFieldPolicy,
    /// Material name resolution.
    pub material_lookup: MaterialLookup,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            textures_dir: PathBuf::from(DEFAULT_TEXTURES_DIR),
            unknown_fields: UnknownFieldPolicy::default(),
            material_lookup: MaterialLookup::default(),
        }
    }
}

impl EditorConfig {
    /// Config with all three roots under `root`.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            source_dir: root.join("sources"),
            results_dir: root.join("results"),
            textures_dir: root.join("textures"),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> GlbEditResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg = serde_json::from_str(&text)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Mutation policies carried by this config.
    pub fn edit_options(&self) -> EditOptions {
        EditOptions {
            unknown_fields: self.unknown_fields,
            material_lookup: self.material_lookup,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
