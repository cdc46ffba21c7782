/// Convenience result type used across glbedit.
pub type GlbEditResult<T> = Result<T, GlbEditError>;

/// Top-level error taxonomy used by editor APIs.
///
/// Every variant carries a human-readable detail message; [`GlbEditError::kind`] gives the
/// machine-checkable discriminant and [`GlbEditError::category`] how a front end should surface it.
#[derive(thiserror::Error, Debug)]
pub enum GlbEditError {
    /// The glTF/GLB file named by the request does not exist.
    #[error("source file not found: {0}")]
    SourceFileNotFound(String),

    /// The texture file named by a texture change does not exist.
    #[error("texture file not found: {0}")]
    TextureFileNotFound(String),

    /// No material in the document carries the requested name.
    #[error("material not found: {0}")]
    MaterialNotFound(String),

    /// Strict lookup found more than one material with the requested name.
    #[error("duplicate material name: {0}")]
    DuplicateMaterialName(String),

    /// The request does not say which texture slot to change.
    #[error("unsupported texture slot: {0}")]
    UnsupportedTextureSlot(String),

    /// An override value has a different type than the value it replaces.
    #[error("parameter type mismatch: {0}")]
    MergeTypeMismatch(String),

    /// An override names a field the material does not have.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The request itself is malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Codec, serialization or I/O fault while producing the result.
    #[error("mutation failed: {0}")]
    MutationFailed(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Machine-checkable error discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ErrorKind {
    SourceFileNotFound,
    TextureFileNotFound,
    MaterialNotFound,
    DuplicateMaterialName,
    UnsupportedTextureSlot,
    MergeTypeMismatch,
    UnknownField,
    InvalidRequest,
    MutationFailed,
}

/// How an error is surfaced to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad input: a referenced file is missing.
    ClientError,
    /// Well-formed but unprocessable request.
    Unprocessable,
    /// Fault on the editor's side.
    ServerError,
}

impl ErrorCategory {
    /// HTTP-equivalent status code.
    pub fn status_code(self) -> u16 {
        match self {
            Self::ClientError => 400,
            Self::Unprocessable => 422,
            Self::ServerError => 500,
        }
    }
}

impl GlbEditError {
    /// Build a [`GlbEditError::SourceFileNotFound`] value.
    pub fn source_not_found(path: impl Into<String>) -> Self {
        Self::SourceFileNotFound(path.into())
    }

    /// Build a [`GlbEditError::TextureFileNotFound`] value.
    pub fn texture_not_found(path: impl Into<String>) -> Self {
        Self::TextureFileNotFound(path.into())
    }

    /// Build a [`GlbEditError::MaterialNotFound`] value.
    pub fn material_not_found(name: impl Into<String>) -> Self {
        Self::MaterialNotFound(name.into())
    }

    /// Build a [`GlbEditError::DuplicateMaterialName`] value.
    pub fn duplicate_material(name: impl Into<String>) -> Self {
        Self::DuplicateMaterialName(name.into())
    }

    /// Build a [`GlbEditError::UnsupportedTextureSlot`] value.
    pub fn unsupported_slot(msg: impl Into<String>) -> Self {
        Self::UnsupportedTextureSlot(msg.into())
    }

    /// Build a [`GlbEditError::MergeTypeMismatch`] value.
    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::MergeTypeMismatch(msg.into())
    }

    /// Build a [`GlbEditError::UnknownField`] value.
    pub fn unknown_field(msg: impl Into<String>) -> Self {
        Self::UnknownField(msg.into())
    }

    /// Build a [`GlbEditError::InvalidRequest`] value.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Build a [`GlbEditError::MutationFailed`] value.
    pub fn mutation_failed(msg: impl Into<String>) -> Self {
        Self::MutationFailed(msg.into())
    }

    /// Discriminant of this error. [`GlbEditError::Other`] reports as `MutationFailed`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SourceFileNotFound(_) => ErrorKind::SourceFileNotFound,
            Self::TextureFileNotFound(_) => ErrorKind::TextureFileNotFound,
            Self::MaterialNotFound(_) => ErrorKind::MaterialNotFound,
            Self::DuplicateMaterialName(_) => ErrorKind::DuplicateMaterialName,
            Self::UnsupportedTextureSlot(_) => ErrorKind::UnsupportedTextureSlot,
            Self::MergeTypeMismatch(_) => ErrorKind::MergeTypeMismatch,
            Self::UnknownField(_) => ErrorKind::UnknownField,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::MutationFailed(_) | Self::Other(_) => ErrorKind::MutationFailed,
        }
    }

    /// Category used to pick a status code or exit code.
    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::SourceFileNotFound | ErrorKind::TextureFileNotFound => {
                ErrorCategory::ClientError
            }
            ErrorKind::MaterialNotFound
            | ErrorKind::DuplicateMaterialName
            | ErrorKind::UnsupportedTextureSlot
            | ErrorKind::MergeTypeMismatch
            | ErrorKind::UnknownField
            | ErrorKind::InvalidRequest => ErrorCategory::Unprocessable,
            ErrorKind::MutationFailed => ErrorCategory::ServerError,
        }
    }

    /// Collapse server-side faults into [`GlbEditError::MutationFailed`] with `context` prefixed,
    /// leaving client-facing kinds untouched.
    pub fn into_mutation_failure(self, context: &str) -> Self {
        match self {
            Self::Other(e) => Self::MutationFailed(format!("{context}: {e:#}")),
            Self::MutationFailed(msg) => Self::MutationFailed(format!("{context}: {msg}")),
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
