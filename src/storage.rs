use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::{
    document::model::{file_name_of, file_stem_of},
    foundation::config::EditorConfig,
    foundation::error::{GlbEditError, GlbEditResult},
};

/// Where source models and texture images come from and where results go.
///
/// Paths are the logical, request-relative strings; implementations decide how they map onto
/// actual storage.
pub trait Storage {
    /// Bytes of a source model. Missing files are [`GlbEditError::SourceFileNotFound`].
    fn read_source(&self, path: &str) -> GlbEditResult<Vec<u8>>;

    /// Whether a texture image exists.
    fn texture_exists(&self, path: &str) -> bool;

    /// Bytes of a texture image. Missing files are [`GlbEditError::TextureFileNotFound`].
    fn read_texture(&self, path: &str) -> GlbEditResult<Vec<u8>>;

    /// Store a result under `result_dir`, returning where it was stored.
    fn write_result(
        &mut self,
        result_dir: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> GlbEditResult<String>;
}

/// Filesystem storage rooted at the directories of an [`EditorConfig`].
#[derive(Clone, Debug)]
pub struct FsStorage {
    config: EditorConfig,
}

impl FsStorage {
    /// Storage over `config`'s directories.
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Absolute-or-relative filesystem path of a source file.
    pub fn source_path(&self, path: &str) -> GlbEditResult<PathBuf> {
        Ok(self.config.source_dir.join(normalize_rel_path(path)?))
    }

    /// Filesystem path of a texture file.
    pub fn texture_path(&self, path: &str) -> GlbEditResult<PathBuf> {
        Ok(self.config.textures_dir.join(normalize_rel_path(path)?))
    }

    /// Filesystem path of a results directory. An empty `result_dir` is the results root.
    pub fn results_path(&self, result_dir: &str) -> GlbEditResult<PathBuf> {
        if result_dir.trim().is_empty() {
            return Ok(self.config.results_dir.clone());
        }
        Ok(self.config.results_dir.join(normalize_rel_path(result_dir)?))
    }
}

impl Storage for FsStorage {
    fn read_source(&self, path: &str) -> GlbEditResult<Vec<u8>> {
        let full = self.source_path(path)?;
        if !full.is_file() {
            return Err(GlbEditError::source_not_found(path));
        }
        read_file(&full)
    }

    fn texture_exists(&self, path: &str) -> bool {
        self.texture_path(path).is_ok_and(|p| p.is_file())
    }

    fn read_texture(&self, path: &str) -> GlbEditResult<Vec<u8>> {
        let full = self.texture_path(path)?;
        if !full.is_file() {
            return Err(GlbEditError::texture_not_found(path));
        }
        read_file(&full)
    }

    fn write_result(
        &mut self,
        result_dir: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> GlbEditResult<String> {
        let dir = self.results_path(result_dir)?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create results dir '{}'", dir.display()))?;
        let out = dir.join(file_name);
        std::fs::write(&out, bytes).with_context(|| format!("write result '{}'", out.display()))?;
        tracing::info!(path = %out.display(), len = bytes.len(), "result written");
        Ok(out.to_string_lossy().into_owned())
    }
}

fn read_file(path: &Path) -> GlbEditResult<Vec<u8>> {
    std::fs::read(path)
        .with_context(|| format!("read '{}'", path.display()))
        .map_err(GlbEditError::from)
}

/// In-memory storage, keyed by normalized logical path.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    sources: HashMap<String, Vec<u8>>,
    textures: HashMap<String, Vec<u8>>,
    results: BTreeMap<String, Vec<u8>>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source model.
    pub fn insert_source(&mut self, path: &str, bytes: Vec<u8>) -> GlbEditResult<()> {
        self.sources.insert(normalize_rel_path(path)?, bytes);
        Ok(())
    }

    /// Register a texture image.
    pub fn insert_texture(&mut self, path: &str, bytes: Vec<u8>) -> GlbEditResult<()> {
        self.textures.insert(normalize_rel_path(path)?, bytes);
        Ok(())
    }

    /// A stored result by the path `write_result` returned.
    pub fn result(&self, path: &str) -> Option<&[u8]> {
        self.results.get(path).map(Vec::as_slice)
    }

    /// Paths of all stored results, sorted.
    pub fn result_paths(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }
}

impl Storage for MemoryStorage {
    fn read_source(&self, path: &str) -> GlbEditResult<Vec<u8>> {
        self.sources
            .get(&normalize_rel_path(path)?)
            .cloned()
            .ok_or_else(|| GlbEditError::source_not_found(path))
    }

    fn texture_exists(&self, path: &str) -> bool {
        normalize_rel_path(path).is_ok_and(|p| self.textures.contains_key(&p))
    }

    fn read_texture(&self, path: &str) -> GlbEditResult<Vec<u8>> {
        self.textures
            .get(&normalize_rel_path(path)?)
            .cloned()
            .ok_or_else(|| GlbEditError::texture_not_found(path))
    }

    fn write_result(
        &mut self,
        result_dir: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> GlbEditResult<String> {
        let key = if result_dir.trim().is_empty() {
            normalize_rel_path(file_name)?
        } else {
            format!("{}/{}", normalize_rel_path(result_dir)?, file_name)
        };
        self.results.insert(key.clone(), bytes.to_vec());
        Ok(key)
    }
}

/// Normalize and validate a request-relative path.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> GlbEditResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') || has_drive_prefix(&s) {
        return Err(GlbEditError::invalid_request(format!(
            "path '{source}' must be relative"
        )));
    }
    if s.is_empty() {
        return Err(GlbEditError::invalid_request("path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(GlbEditError::invalid_request(format!(
                "path '{source}' must not contain '..'"
            )));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(GlbEditError::invalid_request(format!(
            "path '{source}' must contain a file name"
        )));
    }

    Ok(out.join("/"))
}

fn has_drive_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}

/// Result file name for `source_path`: `<stem>_<HHMMSS><ext>`, from seconds since midnight.
pub fn result_file_name(source_path: &str, secs_of_day: u64) -> String {
    let name = file_name_of(source_path);
    let stem = file_stem_of(name);
    let ext = &name[stem.len()..];
    let secs = secs_of_day % 86_400;
    format!(
        "{stem}_{:02}{:02}{:02}{ext}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

/// [`result_file_name`] stamped with the current UTC time of day.
pub fn result_file_name_now(source_path: &str) -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    result_file_name(source_path, secs)
}

#[cfg(test)]
#[path = "../tests/unit/storage.rs"]
mod tests;
