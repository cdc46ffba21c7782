use crate::{
    document::codec::{self, GltfAsset},
    edit::assembler::{apply_parameter_changes, apply_texture_changes},
    foundation::config::EditOptions,
    foundation::error::GlbEditResult,
    request::{EditResponse, ParameterChangeRequest, TextureChangeRequest},
    storage::{Storage, result_file_name_now},
};

/// Runs whole edit requests against a [`Storage`].
///
/// Each request is load, parse, mutate, serialize, save. Nothing is written unless every step
/// before the save succeeded.
#[derive(Debug)]
pub struct GlbEditor<S> {
    storage: S,
    options: EditOptions,
    namer: fn(&str) -> String,
}

impl<S: Storage> GlbEditor<S> {
    /// Editor over `storage`, stamping result names with the current time.
    pub fn new(storage: S, options: EditOptions) -> Self {
        Self {
            storage,
            options,
            namer: result_file_name_now,
        }
    }

    /// Replace the result-name function, e.g. to get stable names in tests.
    pub fn with_result_namer(mut self, namer: fn(&str) -> String) -> Self {
        self.namer = namer;
        self
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the editor, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Mutation policies in use.
    pub fn options(&self) -> EditOptions {
        self.options
    }

    /// Merge parameter overrides into the named materials and save the result.
    #[tracing::instrument(skip(self, request), fields(source = %request.source_path))]
    pub fn change_parameters(
        &mut self,
        request: &ParameterChangeRequest,
    ) -> GlbEditResult<EditResponse> {
        request.validate()?;
        let mut asset = self.load(&request.source_path)?;

        let replaced =
            apply_parameter_changes(&mut asset.document, &request.materials, self.options)?;
        tracing::debug!(replaced, "parameter changes applied");

        self.save(&asset, &request.source_path, &request.result_path)
    }

    /// Point the selected texture slots at new image files, embed them and save the result.
    #[tracing::instrument(skip(self, request), fields(source = %request.source_path))]
    pub fn change_textures(
        &mut self,
        request: &TextureChangeRequest,
    ) -> GlbEditResult<EditResponse> {
        request.validate()?;
        let mut asset = self.load(&request.source_path)?;

        let report = apply_texture_changes(
            &mut asset.document,
            &request.files,
            &self.storage,
            self.options,
        )?;
        tracing::debug!(
            slots = report.changes.len(),
            images = report.appended_images.len(),
            "texture changes applied"
        );

        let storage = &self.storage;
        codec::embed_images(&mut asset.document, &report.appended_images, |uri| {
            storage.read_texture(uri)
        })
        .map_err(|e| e.into_mutation_failure("embed texture images"))?;

        self.save(&asset, &request.source_path, &request.result_path)
    }

    fn load(&self, source_path: &str) -> GlbEditResult<GltfAsset> {
        let bytes = self.storage.read_source(source_path)?;
        codec::parse(&bytes).map_err(|e| e.into_mutation_failure("load source"))
    }

    fn save(
        &mut self,
        asset: &GltfAsset,
        source_path: &str,
        result_dir: &str,
    ) -> GlbEditResult<EditResponse> {
        let bytes = codec::serialize(asset).map_err(|e| e.into_mutation_failure("serialize"))?;
        let filename = (self.namer)(source_path);
        let stored = self
            .storage
            .write_result(result_dir, &filename, &bytes)
            .map_err(|e| e.into_mutation_failure("save result"))?;
        tracing::info!(result = %stored, len = bytes.len(), "edit saved");
        Ok(EditResponse::done(stored, filename))
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
