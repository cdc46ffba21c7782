use serde_json::{Value, json};

use super::*;
use crate::{
    foundation::config::{MaterialLookup, UnknownFieldPolicy},
    storage::MemoryStorage,
};

fn doc(v: Value) -> Document {
    serde_json::from_value(v).unwrap()
}

fn fragment(v: Value) -> serde_json::Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("not an object: {other}"),
    }
}

fn file(path: &str, materials: Value) -> TextureFileChange {
    serde_json::from_value(json!({ "textureFilePath": path, "materials": materials })).unwrap()
}

fn storage_with(paths: &[&str]) -> MemoryStorage {
    let mut s = MemoryStorage::new();
    for p in paths {
        s.insert_texture(p, vec![0]).unwrap();
    }
    s
}

fn scene() -> Document {
    doc(json!({
        "asset": { "version": "2.0" },
        "materials": [
            { "name": "A", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 }, "metallicFactor": 1 } },
            { "name": "B", "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } },
            { "name": "C", "pbrMetallicRoughness": { "baseColorTexture": { "index": 1 } } }
        ],
        "textures": [{ "source": 0 }, { "source": 1 }],
        "images": [{ "uri": "a.png" }, { "uri": "c.png" }]
    }))
}

#[test]
fn parameter_changes_apply_to_every_material_with_the_name() {
    let mut d = doc(json!({
        "materials": [
            { "name": "Twin", "alphaMode": "OPAQUE" },
            { "name": "Other", "alphaMode": "OPAQUE" },
            { "name": "Twin", "alphaMode": "MASK" }
        ]
    }));
    let changes = vec![MaterialChange::new("Twin", fragment(json!({ "alphaMode": "BLEND" })))];

    let n = apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap();

    assert_eq!(n, 2);
    assert_eq!(d.materials[0].rest["alphaMode"], json!("BLEND"));
    assert_eq!(d.materials[1].rest["alphaMode"], json!("OPAQUE"));
    assert_eq!(d.materials[2].rest["alphaMode"], json!("BLEND"));
}

#[test]
fn parameter_changes_are_all_or_nothing() {
    let mut d = scene();
    let before = d.clone();
    let changes = vec![
        MaterialChange::new(
            "A",
            fragment(json!({ "pbrMetallicRoughness": { "metallicFactor": 0 } })),
        ),
        MaterialChange::new(
            "C",
            fragment(json!({ "pbrMetallicRoughness": { "sheenFactor": 0.5 } })),
        ),
    ];

    let err = apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap_err();
    assert!(matches!(err, GlbEditError::UnknownField(_)));
    assert_eq!(d, before);
}

#[test]
fn unknown_fields_insert_under_policy() {
    let mut d = scene();
    let changes = vec![MaterialChange::new(
        "C",
        fragment(json!({ "pbrMetallicRoughness": { "sheenFactor": 0.5 } })),
    )];
    let options = EditOptions {
        unknown_fields: UnknownFieldPolicy::Insert,
        ..EditOptions::default()
    };

    apply_parameter_changes(&mut d, &changes, options).unwrap();
    let pbr = d.materials[2].pbr_metallic_roughness.as_ref().unwrap();
    assert_eq!(pbr.rest["sheenFactor"], json!(0.5));
    assert_eq!(pbr.base_color_texture.as_ref().unwrap().index, 1);
}

#[test]
fn unknown_material_name_is_reported() {
    let mut d = scene();
    let changes = vec![MaterialChange::new("Nope", fragment(json!({})))];
    let err = apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap_err();
    assert!(matches!(err, GlbEditError::MaterialNotFound(_)));
}

#[test]
fn strict_lookup_rejects_duplicate_names() {
    let mut d = doc(json!({ "materials": [{ "name": "Twin" }, { "name": "Twin" }] }));
    let changes = vec![MaterialChange::new("Twin", fragment(json!({})))];
    let options = EditOptions {
        material_lookup: MaterialLookup::Strict,
        ..EditOptions::default()
    };
    let err = apply_parameter_changes(&mut d, &changes, options).unwrap_err();
    assert!(matches!(err, GlbEditError::DuplicateMaterialName(_)));
}

#[test]
fn batch_reuses_image_for_the_same_file() {
    let mut d = scene();
    let files = vec![file(
        "tex/wood.png",
        json!([
            { "name": "A", "pbrMetallicRoughness": { "baseColorTexture": {} } },
            { "name": "C", "pbrMetallicRoughness": { "baseColorTexture": {} } }
        ]),
    )];

    let report = apply_texture_changes(
        &mut d,
        &files,
        &storage_with(&["tex/wood.png"]),
        EditOptions::default(),
    )
    .unwrap();

    assert_eq!(report.changes.len(), 2);
    assert_eq!(report.appended_images, vec![2]);
    assert!(matches!(report.changes[0].outcome, SlotOutcome::Forked { previous: 0, .. }));
    assert_eq!(
        report.changes[1].outcome,
        SlotOutcome::ReplacedInPlace { texture: 1, image: 2 }
    );
    assert_eq!(d.images.len(), 3);
    // B still shows what it showed before.
    assert_eq!(
        TextureSlot::BaseColor.read(&d.materials[1]).unwrap().index,
        0
    );
    assert_eq!(d.image_of(0), Some(0));
}

#[test]
fn later_files_see_earlier_changes() {
    let mut d = scene();
    let files = vec![
        file(
            "wood.png",
            json!([{ "name": "A", "pbrMetallicRoughness": { "baseColorTexture": {} } }]),
        ),
        file(
            "stone.png",
            json!([{ "name": "A", "pbrMetallicRoughness": { "baseColorTexture": {} } }]),
        ),
    ];

    let report = apply_texture_changes(
        &mut d,
        &files,
        &storage_with(&["wood.png", "stone.png"]),
        EditOptions::default(),
    )
    .unwrap();

    // The forked texture belongs to A alone, so the second change repoints it in place.
    let forked = report.changes[0].outcome.texture();
    assert_eq!(
        report.changes[1].outcome,
        SlotOutcome::ReplacedInPlace {
            texture: forked,
            image: 3
        }
    );
    assert_eq!(d.images[3].uri.as_deref(), Some("stone.png"));
    assert_eq!(report.appended_images, vec![2, 3]);
}

#[test]
fn one_entry_can_select_several_slots() {
    let mut d = scene();
    let files = vec![file(
        "detail.png",
        json!([{
            "name": "C",
            "pbrMetallicRoughness": { "metallicRoughnessTexture": {} },
            "normalTexture": {}
        }]),
    )];

    let report = apply_texture_changes(
        &mut d,
        &files,
        &storage_with(&["detail.png"]),
        EditOptions::default(),
    )
    .unwrap();

    let slots: Vec<_> = report.changes.iter().map(|c| c.slot).collect();
    assert_eq!(slots, vec![TextureSlot::MetallicRoughness, TextureSlot::Normal]);
    assert!(report
        .changes
        .iter()
        .all(|c| matches!(c.outcome, SlotOutcome::Created { image: 2, .. })));
    assert_eq!(d.images.len(), 3);
    assert_eq!(d.textures.len(), 4);
}

#[test]
fn missing_texture_file_fails_before_mutating() {
    let mut d = scene();
    let before = d.clone();
    let files = vec![file(
        "missing.png",
        json!([{ "name": "A", "normalTexture": {} }]),
    )];

    let err = apply_texture_changes(&mut d, &files, &storage_with(&[]), EditOptions::default())
        .unwrap_err();
    assert!(matches!(err, GlbEditError::TextureFileNotFound(p) if p == "missing.png"));
    assert_eq!(d, before);
}

#[test]
fn ambiguous_fragment_is_unsupported() {
    let mut d = scene();
    let files = vec![file(
        "wood.png",
        json!([{ "name": "A", "pbrMetallicRoughness": { "baseColorFactor": [1, 1, 1, 1] } }]),
    )];

    let err = apply_texture_changes(
        &mut d,
        &files,
        &storage_with(&["wood.png"]),
        EditOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, GlbEditError::UnsupportedTextureSlot(_)));
}

#[test]
fn merged_texture_reference_must_name_a_texture() {
    let mut d = scene();
    let before = d.clone();
    let changes = vec![MaterialChange::new(
        "C",
        fragment(json!({ "pbrMetallicRoughness": { "baseColorTexture": { "index": 99 } } })),
    )];

    let err = apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap_err();
    let GlbEditError::InvalidRequest(msg) = err else {
        panic!("expected InvalidRequest, got {err:?}");
    };
    assert!(msg.contains("baseColorTexture.index 99"), "{msg}");
    assert_eq!(d, before);

    // Pointing at an existing texture is fine.
    let changes = vec![MaterialChange::new(
        "C",
        fragment(json!({ "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } } })),
    )];
    apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap();
    assert_eq!(TextureSlot::BaseColor.read(&d.materials[2]).unwrap().index, 0);
}

#[test]
fn dangling_reference_already_in_the_file_does_not_block_edits() {
    let mut d = doc(json!({
        "materials": [{
            "name": "Old",
            "doubleSided": false,
            "occlusionTexture": { "index": 7 }
        }]
    }));
    let changes = vec![MaterialChange::new("Old", fragment(json!({ "doubleSided": true })))];
    apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap();
    assert_eq!(d.materials[0].rest["doubleSided"], json!(true));

    let changes = vec![MaterialChange::new(
        "Old",
        fragment(json!({ "occlusionTexture": { "index": 8 } })),
    )];
    let err = apply_parameter_changes(&mut d, &changes, EditOptions::default()).unwrap_err();
    assert!(matches!(err, GlbEditError::InvalidRequest(_)));
}
