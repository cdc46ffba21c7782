//! Type-checked deep merge of override fragments into material parameter trees.

use serde_json::{Map, Value, json};

use crate::{
    document::model::Material,
    foundation::config::UnknownFieldPolicy,
    foundation::error::{GlbEditError, GlbEditResult},
};

/// Merge `overrides` into `original`, returning a new tree.
///
/// Only keys present in `overrides` are visited:
///
/// - two objects merge recursively;
/// - a list in `original` has its leading elements replaced by the override list, trailing
///   original elements are kept (`[1,0,0,1]` + `[0,1,0]` = `[0,1,0,1]`);
/// - any other value is replaced when both sides have the same JSON type. Integers and floats
///   count as one type, except that `index` and `texCoord` must stay non-negative integers
///   (`1.0` is written back as `1`).
///
/// `original` is never modified, so a failed merge leaves it intact.
pub fn merge_params(
    original: &Map<String, Value>,
    overrides: &Map<String, Value>,
    policy: UnknownFieldPolicy,
) -> GlbEditResult<Map<String, Value>> {
    let mut path = Vec::new();
    merge_object(original, overrides, policy, &mut path)
}

/// Merge a change fragment into a typed material.
///
/// The material is lowered to its JSON tree, merged, and raised back; a merged tree that no longer
/// describes a valid material is a type mismatch. glTF fields the file leaves at their schema
/// default are type-checked against that default, and are only written when the fragment sets them.
pub fn merge_material(
    material: &Material,
    fragment: &Map<String, Value>,
    policy: UnknownFieldPolicy,
) -> GlbEditResult<Material> {
    let tree = match serde_json::to_value(material) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(GlbEditError::mutation_failed("material did not lower to an object")),
        Err(e) => return Err(GlbEditError::mutation_failed(format!("lower material: {e}"))),
    };

    let tree = with_schema_defaults(tree, fragment);
    let merged = merge_params(&tree, fragment, policy)?;
    serde_json::from_value(Value::Object(merged)).map_err(|e| {
        GlbEditError::type_mismatch(format!(
            "merged parameters of material '{}' are not a valid material: {e}",
            material.name.as_deref().unwrap_or("<unnamed>")
        ))
    })
}

/// Properties that must stay non-negative integers (texture references).
const INTEGER_FIELDS: [&str; 2] = ["index", "texCoord"];

/// glTF schema default of a material property.
fn material_default(key: &str) -> Option<Value> {
    match key {
        "alphaMode" => Some(json!("OPAQUE")),
        "alphaCutoff" => Some(json!(0.5)),
        "doubleSided" => Some(json!(false)),
        "emissiveFactor" => Some(json!([0.0, 0.0, 0.0])),
        _ => None,
    }
}

/// glTF schema default of a `pbrMetallicRoughness` property.
fn pbr_default(key: &str) -> Option<Value> {
    match key {
        "baseColorFactor" => Some(json!([1.0, 1.0, 1.0, 1.0])),
        "metallicFactor" | "roughnessFactor" => Some(json!(1.0)),
        _ => None,
    }
}

/// Fill in schema defaults for the absent properties `fragment` overrides.
fn with_schema_defaults(
    mut tree: Map<String, Value>,
    fragment: &Map<String, Value>,
) -> Map<String, Value> {
    fill_defaults(&mut tree, fragment, material_default);

    if let Some(Value::Object(pbr_fragment)) = fragment.get("pbrMetallicRoughness") {
        let pbr = tree
            .entry("pbrMetallicRoughness")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(pbr) = pbr {
            fill_defaults(pbr, pbr_fragment, pbr_default);
        }
    }
    tree
}

fn fill_defaults(
    tree: &mut Map<String, Value>,
    fragment: &Map<String, Value>,
    default_of: fn(&str) -> Option<Value>,
) {
    for key in fragment.keys() {
        if tree.contains_key(key) {
            continue;
        }
        if let Some(value) = default_of(key) {
            tree.insert(key.clone(), value);
        }
    }
}

fn merge_object<'a>(
    original: &Map<String, Value>,
    overrides: &'a Map<String, Value>,
    policy: UnknownFieldPolicy,
    path: &mut Vec<&'a str>,
) -> GlbEditResult<Map<String, Value>> {
    let mut out = original.clone();

    for (key, new) in overrides {
        path.push(key);
        let merged = match original.get(key) {
            None => match policy {
                UnknownFieldPolicy::Reject => {
                    return Err(GlbEditError::unknown_field(format!(
                        "'{}' is not present in the material",
                        path.join(".")
                    )));
                }
                UnknownFieldPolicy::Insert => new.clone(),
            },
            Some(old) => merge_value(old, new, policy, path)?,
        };
        out.insert(key.clone(), merged);
        path.pop();
    }

    Ok(out)
}

fn merge_value<'a>(
    old: &Value,
    new: &'a Value,
    policy: UnknownFieldPolicy,
    path: &mut Vec<&'a str>,
) -> GlbEditResult<Value> {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => {
            Ok(Value::Object(merge_object(old, new, policy, path)?))
        }
        (Value::Array(old), Value::Array(new)) => {
            let mut items = new.clone();
            if old.len() > new.len() {
                items.extend_from_slice(&old[new.len()..]);
            }
            Ok(Value::Array(items))
        }
        (Value::Number(_), Value::Number(n))
            if path.last().is_some_and(|key| INTEGER_FIELDS.contains(key)) =>
        {
            whole_number(n).map(Value::from).ok_or_else(|| {
                GlbEditError::type_mismatch(format!(
                    "'{}' must be a non-negative integer, got {n}",
                    path.join(".")
                ))
            })
        }
        (old, new) if type_name(old) == type_name(new) => Ok(new.clone()),
        (old, new) => Err(GlbEditError::type_mismatch(format!(
            "'{}' is {} but the override is {}",
            path.join("."),
            type_name(old),
            type_name(new)
        ))),
    }
}

fn whole_number(n: &serde_json::Number) -> Option<u64> {
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    let f = n.as_f64()?;
    (f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64).then_some(f as u64)
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/edit/merge.rs"]
mod tests;
