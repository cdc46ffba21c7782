use serde_json::json;

use super::*;

fn material(v: Value) -> Material {
    serde_json::from_value(v).unwrap()
}

fn fragment(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn read_follows_each_nesting_depth() {
    let m = material(json!({
        "name": "M",
        "pbrMetallicRoughness": {
            "baseColorTexture": { "index": 1 },
            "metallicRoughnessTexture": { "index": 2 }
        },
        "normalTexture": { "index": 3 }
    }));
    assert_eq!(TextureSlot::BaseColor.read(&m).unwrap().index, 1);
    assert_eq!(TextureSlot::MetallicRoughness.read(&m).unwrap().index, 2);
    assert_eq!(TextureSlot::Normal.read(&m).unwrap().index, 3);
    assert!(TextureSlot::Normal.resolves_to(&m, 3));
    assert!(!TextureSlot::BaseColor.resolves_to(&m, 3));
}

#[test]
fn read_absent_slots() {
    let m = material(json!({ "name": "M" }));
    for slot in TextureSlot::ALL {
        assert!(slot.read(&m).is_none());
    }
    let m = material(json!({ "name": "M", "pbrMetallicRoughness": { "metallicFactor": 1 } }));
    assert!(TextureSlot::BaseColor.read(&m).is_none());
}

#[test]
fn bind_creates_pbr_block_when_missing() {
    let mut m = material(json!({ "name": "M" }));
    TextureSlot::MetallicRoughness.bind(&mut m, TextureRef::new(4));
    let pbr = m.pbr_metallic_roughness.as_ref().unwrap();
    assert_eq!(pbr.metallic_roughness_texture.as_ref().unwrap().index, 4);
    assert!(pbr.base_color_texture.is_none());
}

#[test]
fn bind_keeps_existing_pbr_factors() {
    let mut m = material(json!({
        "name": "M",
        "pbrMetallicRoughness": { "baseColorFactor": [1, 0, 0, 1], "metallicFactor": 0.2 }
    }));
    TextureSlot::BaseColor.bind(&mut m, TextureRef::new(0));
    let pbr = m.pbr_metallic_roughness.as_ref().unwrap();
    assert_eq!(pbr.rest["baseColorFactor"], json!([1, 0, 0, 1]));
    assert_eq!(pbr.rest["metallicFactor"], json!(0.2));
    assert_eq!(pbr.base_color_texture.as_ref().unwrap().index, 0);
}

#[test]
fn bind_normal_is_direct() {
    let mut m = material(json!({ "name": "M" }));
    TextureSlot::Normal.bind(&mut m, TextureRef::new(9));
    assert_eq!(m.normal_texture.as_ref().unwrap().index, 9);
    assert!(m.pbr_metallic_roughness.is_none());
}

#[test]
fn read_mut_edits_in_place() {
    let mut m = material(json!({ "name": "M", "normalTexture": { "index": 0, "scale": 0.5 } }));
    TextureSlot::Normal.read_mut(&mut m).unwrap().index = 5;
    let r = m.normal_texture.as_ref().unwrap();
    assert_eq!((r.index, r.scale), (5, Some(0.5)));
}

#[test]
fn fragment_selects_pbr_slots_in_order() {
    let slots = slots_for_fragment(&fragment(json!({
        "name": "M",
        "pbrMetallicRoughness": { "metallicRoughnessTexture": {}, "baseColorTexture": {} }
    })))
    .unwrap();
    assert_eq!(slots, vec![TextureSlot::BaseColor, TextureSlot::MetallicRoughness]);
}

#[test]
fn fragment_selects_pbr_and_normal_together() {
    let slots = slots_for_fragment(&fragment(json!({
        "name": "M",
        "pbrMetallicRoughness": { "baseColorTexture": { "index": 0 } },
        "normalTexture": {}
    })))
    .unwrap();
    assert_eq!(slots, vec![TextureSlot::BaseColor, TextureSlot::Normal]);
}

#[test]
fn ambiguous_pbr_fragment_is_rejected() {
    for v in [
        json!({ "name": "M", "pbrMetallicRoughness": {} }),
        json!({ "name": "M", "pbrMetallicRoughness": { "baseColorFactor": [1, 1, 1, 1] } }),
        json!({ "name": "M", "pbrMetallicRoughness": { "baseColorTexture": 3 }, "normalTexture": {} }),
        json!({ "name": "M", "pbrMetallicRoughness": "baseColorTexture" }),
    ] {
        let err = slots_for_fragment(&fragment(v.clone())).unwrap_err();
        assert!(matches!(err, GlbEditError::UnsupportedTextureSlot(_)), "{v}");
    }
}

#[test]
fn fragment_without_slots_is_rejected() {
    let err = slots_for_fragment(&fragment(json!({ "name": "M", "normalTexture": null })))
        .unwrap_err();
    assert!(matches!(err, GlbEditError::UnsupportedTextureSlot(_)));
}

#[test]
fn display_uses_gltf_key() {
    assert_eq!(TextureSlot::MetallicRoughness.to_string(), "metallicRoughnessTexture");
}
