use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::foundation::error::{GlbEditError, GlbEditResult};

/// Status string reported by a successful edit.
pub const STATUS_DONE: &str = "done";

/// One material entry of a request: the lookup name plus the fields to change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialChange {
    /// Material name to look up.
    pub name: String,
    /// Everything except `name`: the override fragment for parameter changes, or the slot
    /// selection for texture changes.
    #[serde(flatten)]
    pub fragment: Map<String, Value>,
}

impl MaterialChange {
    /// Change entry for `name` with the given fragment object.
    pub fn new(name: impl Into<String>, fragment: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            fragment,
        }
    }
}

/// Merge parameter overrides into named materials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterChangeRequest {
    /// Source file, relative to the configured source directory.
    #[serde(alias = "filepath")]
    pub source_path: String,
    /// Result subdirectory, relative to the configured results directory.
    #[serde(default)]
    pub result_path: String,
    /// Material entries.
    pub materials: Vec<MaterialChange>,
}

/// Texture file applied to a list of material slots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureFileChange {
    /// Texture image, relative to the configured textures directory.
    #[serde(alias = "texturefilepath")]
    pub texture_file_path: String,
    /// Material entries selecting slots via `pbrMetallicRoughness` and/or `normalTexture`.
    pub materials: Vec<MaterialChange>,
}

/// Replace textures on named materials.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureChangeRequest {
    /// Source file, relative to the configured source directory.
    #[serde(alias = "glbfilepath")]
    pub source_path: String,
    /// Result subdirectory, relative to the configured results directory.
    #[serde(default)]
    pub result_path: String,
    /// Texture files, applied in order.
    pub files: Vec<TextureFileChange>,
}

/// Reply to a successful edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    /// Always [`STATUS_DONE`].
    pub status: String,
    /// Where the result was stored.
    pub result_path: String,
    /// File name of the result.
    pub filename: String,
}

impl EditResponse {
    /// Successful response for a stored result.
    pub fn done(result_path: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            status: STATUS_DONE.to_string(),
            result_path: result_path.into(),
            filename: filename.into(),
        }
    }
}

impl ParameterChangeRequest {
    /// Reject empty paths, empty material lists and unnamed entries.
    pub fn validate(&self) -> GlbEditResult<()> {
        require_non_empty("sourcePath", &self.source_path)?;
        validate_materials("materials", &self.materials)
    }
}

impl TextureChangeRequest {
    /// Reject empty paths, empty file lists and empty material lists.
    pub fn validate(&self) -> GlbEditResult<()> {
        require_non_empty("sourcePath", &self.source_path)?;
        if self.files.is_empty() {
            return Err(GlbEditError::invalid_request("files must not be empty"));
        }
        for (i, file) in self.files.iter().enumerate() {
            require_non_empty(&format!("files[{i}].textureFilePath"), &file.texture_file_path)?;
            validate_materials(&format!("files[{i}].materials"), &file.materials)?;
        }
        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> GlbEditResult<()> {
    if value.trim().is_empty() {
        return Err(GlbEditError::invalid_request(format!("{field} must be non-empty")));
    }
    Ok(())
}

fn validate_materials(field: &str, materials: &[MaterialChange]) -> GlbEditResult<()> {
    if materials.is_empty() {
        return Err(GlbEditError::invalid_request(format!("{field} must not be empty")));
    }
    for (i, m) in materials.iter().enumerate() {
        require_non_empty(&format!("{field}[{i}].name"), &m.name)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/request.rs"]
mod tests;
