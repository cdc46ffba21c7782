use std::borrow::Cow;

use anyhow::Context as _;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::{
    document::model::Document,
    foundation::error::{GlbEditError, GlbEditResult},
};

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// On-disk container a document was read from; serialization writes the same one back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Container {
    /// Binary glTF: JSON chunk plus optional BIN chunk.
    Glb,
    /// Plain glTF JSON.
    Json,
}

/// A parsed glTF asset: the editable document plus the opaque binary payload.
#[derive(Clone, Debug)]
pub struct GltfAsset {
    /// Editable JSON document.
    pub document: Document,
    blob: Option<Vec<u8>>,
    container: Container,
}

impl GltfAsset {
    /// Wrap a document with an optional blob.
    pub fn new(document: Document, blob: Option<Vec<u8>>, container: Container) -> Self {
        Self {
            document,
            blob,
            container,
        }
    }

    /// Binary payload (GLB `BIN` chunk). Editing never touches it.
    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    /// Replace the binary payload.
    pub fn set_blob(&mut self, blob: Option<Vec<u8>>) {
        self.blob = blob;
    }

    /// Container this asset serializes to.
    pub fn container(&self) -> Container {
        self.container
    }
}

/// Parse GLB or glTF JSON bytes. GLB is detected by its magic number.
pub fn parse(bytes: &[u8]) -> GlbEditResult<GltfAsset> {
    if bytes.starts_with(GLB_MAGIC) {
        let glb = gltf::Glb::from_slice(bytes)
            .map_err(|e| GlbEditError::mutation_failed(format!("parse GLB container: {e}")))?;
        let document: Document = serde_json::from_slice(&glb.json)
            .map_err(|e| GlbEditError::mutation_failed(format!("parse GLB JSON chunk: {e}")))?;
        let blob = glb.bin.map(Cow::into_owned);
        Ok(GltfAsset::new(document, blob, Container::Glb))
    } else {
        let document: Document = serde_json::from_slice(bytes)
            .map_err(|e| GlbEditError::mutation_failed(format!("parse glTF JSON: {e}")))?;
        Ok(GltfAsset::new(document, None, Container::Json))
    }
}

/// Serialize back to the asset's container. The blob is written byte-for-byte.
pub fn serialize(asset: &GltfAsset) -> GlbEditResult<Vec<u8>> {
    match asset.container {
        Container::Glb => {
            let json = serde_json::to_vec(&asset.document)
                .map_err(|e| GlbEditError::mutation_failed(format!("serialize JSON chunk: {e}")))?;
            let glb = gltf::Glb {
                header: gltf::binary::Header {
                    magic: *GLB_MAGIC,
                    version: 2,
                    // Recomputed by the writer.
                    length: 0,
                },
                json: Cow::Owned(json),
                bin: asset.blob.as_deref().map(Cow::Borrowed),
            };
            glb.to_vec()
                .map_err(|e| GlbEditError::mutation_failed(format!("write GLB container: {e}")))
        }
        Container::Json => serde_json::to_vec_pretty(&asset.document)
            .map_err(|e| GlbEditError::mutation_failed(format!("serialize glTF JSON: {e}"))),
    }
}

/// Convert the file-backed images at `indices` into self-contained `data:` URIs.
///
/// `load` resolves an image URI to its bytes. Images that are already embedded are skipped. The
/// MIME type is sniffed from the content, falling back to the URI's extension.
pub fn embed_images<F>(document: &mut Document, indices: &[usize], mut load: F) -> GlbEditResult<()>
where
    F: FnMut(&str) -> GlbEditResult<Vec<u8>>,
{
    for &idx in indices {
        let image = document.images.get_mut(idx).ok_or_else(|| {
            GlbEditError::mutation_failed(format!("embed: image index {idx} out of range"))
        })?;
        if !image.is_file_backed() {
            continue;
        }
        let Some(uri) = image.uri.clone() else {
            continue;
        };

        let bytes = load(&uri)?;
        let mime = sniff_mime(&uri, &bytes)?;
        image.uri = Some(data_uri(mime, &bytes));
        tracing::debug!(image = idx, %uri, mime, len = bytes.len(), "embedded image");
    }
    Ok(())
}

/// Build a base64 `data:` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

fn sniff_mime(uri: &str, bytes: &[u8]) -> GlbEditResult<&'static str> {
    let format = image::guess_format(bytes)
        .or_else(|_| image::ImageFormat::from_path(uri))
        .with_context(|| format!("detect image format of '{uri}'"))
        .map_err(|e| GlbEditError::mutation_failed(format!("{e:#}")))?;
    Ok(format.to_mime_type())
}

#[cfg(test)]
#[path = "../../tests/unit/document/codec.rs"]
mod tests;
