//! glbedit edits the materials of glTF 2.0 assets (`.gltf` JSON or binary `.glb`).
//!
//! Two kinds of edit are supported:
//!
//! - **Parameter changes** deep-merge a JSON fragment into every material carrying a given name,
//!   rejecting overrides whose JSON type differs from the value they replace.
//! - **Texture changes** point a material's base-color, metallic-roughness or normal slot at a new
//!   image file. A texture that other materials also use is never edited in place; the slot is
//!   rebound to a fresh texture instead, so only the requested material changes.
//!
//! # Pipeline
//!
//! 1. **Load**: [`Storage::read_source`] then [`parse`] into a [`GltfAsset`].
//! 2. **Mutate**: [`apply_parameter_changes`] or [`apply_texture_changes`] on the [`Document`].
//! 3. **Embed**: newly referenced images become `data:` URIs via [`embed_images`].
//! 4. **Save**: [`serialize`] to the input's container and [`Storage::write_result`].
//!
//! [`GlbEditor`] runs the whole pipeline for one request. The binary chunk of a GLB is carried
//! through untouched.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod document;
mod edit;
mod foundation;
mod request;
mod service;
mod storage;

pub use document::codec::{Container, GltfAsset, data_uri, embed_images, parse, serialize};
pub use document::model::{
    Document, Image, Material, Passthrough, PbrMetallicRoughness, Texture, TextureRef,
    file_name_of, file_stem_of,
};
pub use edit::assembler::{
    AssemblyReport, SlotChange, apply_parameter_changes, apply_texture_changes,
};
pub use edit::merge::{merge_material, merge_params};
pub use edit::mutator::{MutationPass, SlotOutcome, find_material};
pub use edit::sharing::{Sharing, TextureUsage, classify, usage};
pub use edit::slot::{TextureSlot, slots_for_fragment};
pub use foundation::config::{
    DEFAULT_RESULTS_DIR, DEFAULT_SOURCE_DIR, DEFAULT_TEXTURES_DIR, EditOptions, EditorConfig,
    MaterialLookup, UnknownFieldPolicy,
};
pub use foundation::error::{ErrorCategory, ErrorKind, GlbEditError, GlbEditResult};
pub use request::{
    EditResponse, MaterialChange, ParameterChangeRequest, STATUS_DONE, TextureChangeRequest,
    TextureFileChange,
};
pub use service::GlbEditor;
pub use storage::{
    FsStorage, MemoryStorage, Storage, normalize_rel_path, result_file_name, result_file_name_now,
};
