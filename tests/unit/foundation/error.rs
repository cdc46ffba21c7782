use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GlbEditError::source_not_found("a.glb")
            .to_string()
            .contains("source file not found:")
    );
    assert!(
        GlbEditError::texture_not_found("t.png")
            .to_string()
            .contains("texture file not found:")
    );
    assert!(
        GlbEditError::type_mismatch("x")
            .to_string()
            .contains("parameter type mismatch:")
    );
    assert!(
        GlbEditError::mutation_failed("x")
            .to_string()
            .contains("mutation failed:")
    );
}

#[test]
fn kinds_map_to_categories() {
    let cases = [
        (GlbEditError::source_not_found("x"), ErrorCategory::ClientError),
        (GlbEditError::texture_not_found("x"), ErrorCategory::ClientError),
        (GlbEditError::material_not_found("x"), ErrorCategory::Unprocessable),
        (GlbEditError::duplicate_material("x"), ErrorCategory::Unprocessable),
        (GlbEditError::unsupported_slot("x"), ErrorCategory::Unprocessable),
        (GlbEditError::type_mismatch("x"), ErrorCategory::Unprocessable),
        (GlbEditError::unknown_field("x"), ErrorCategory::Unprocessable),
        (GlbEditError::invalid_request("x"), ErrorCategory::Unprocessable),
        (GlbEditError::mutation_failed("x"), ErrorCategory::ServerError),
    ];
    for (err, category) in cases {
        assert_eq!(err.category(), category, "{err}");
    }
    assert_eq!(ErrorCategory::ClientError.status_code(), 400);
    assert_eq!(ErrorCategory::Unprocessable.status_code(), 422);
    assert_eq!(ErrorCategory::ServerError.status_code(), 500);
}

#[test]
fn other_preserves_source_and_reports_as_mutation_failed() {
    let base = std::io::Error::other("boom");
    let err = GlbEditError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::MutationFailed);
}

#[test]
fn into_mutation_failure_keeps_client_kinds() {
    let err = GlbEditError::material_not_found("Body").into_mutation_failure("save");
    assert_eq!(err.kind(), ErrorKind::MaterialNotFound);

    let err = GlbEditError::Other(anyhow::anyhow!("disk full")).into_mutation_failure("save");
    let GlbEditError::MutationFailed(msg) = err else {
        panic!("expected MutationFailed");
    };
    assert!(msg.starts_with("save: "));
    assert!(msg.contains("disk full"));
}

#[test]
fn kind_serializes_snake_case() {
    let s = serde_json::to_string(&ErrorKind::UnsupportedTextureSlot).unwrap();
    assert_eq!(s, "\"unsupported_texture_slot\"");
}
