// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Property discovery over a component's serialized property bag.
//!
//! Hosts do not publish a schema. A property is found by probing the record in a fixed order and
//! its semantic type is guessed from the value's shape plus the property's name. The guess is a
//! diagnostic only; the caller's declared type always decides coercion.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

/// Keys that never name a user-facing property when falling back to the record's own keys.
const EXCLUDED_RECORD_KEYS: &[&str] = &[
    "__type__",
    "cid",
    "node",
    "uuid",
    "name",
    "enabled",
    "type",
    "readonly",
    "visible",
    "sceneLocalId",
    "properties",
];

/// Keys of plain value objects (`{x, y}`, `{width, height}`, `{r, g, b, a}`), which are data
/// rather than descriptors.
const SIMPLE_VALUE_KEYS: &[&str] = &["x", "y", "z", "w", "width", "height", "r", "g", "b", "a"];

const ASSET_NAME_HINTS: &[&str] = &["spriteframe", "texture", "material", "font", "clip", "prefab"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum InferredType {
    String,
    Number,
    Boolean,
    Color,
    Vec2,
    Vec3,
    Size,
    Node,
    Component,
    Asset,
    NodeArray,
    ColorArray,
    Array,
    Unknown,
}

impl InferredType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Size => "size",
            Self::Node => "node",
            Self::Component => "component",
            Self::Asset => "asset",
            Self::NodeArray => "nodeArray",
            Self::ColorArray => "colorArray",
            Self::Array => "array",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAnalysis {
    pub exists: bool,
    pub inferred_type: InferredType,
    pub available_names: Vec<String>,
    /// The property's current value (`Some(Null)` for an existing but unset property).
    pub original_value: Option<Value>,
    /// The host descriptor the value was read from, when it came from one.
    pub descriptor: Option<Value>,
}

/// Keys the snapshot layer synthesizes at the top of a record. A host descriptor of the same name
/// is the real property and shadows them.
const SYNTHESIZED_RECORD_KEYS: &[&str] = &["type", "sceneLocalId"];

/// Looks up `property` in `record`.
///
/// Search order, first match wins: the record's own key, then the nested descriptor map at
/// `properties.value`, then a flat descriptor map at `properties`. A descriptor named like one of
/// the synthesized identity keys wins over that key. When no descriptor is found at all, the
/// record's own keys (minus identity keys and `_`-prefixed ones) are offered as names.
pub fn analyze(record: &Value, property: &str) -> PropertyAnalysis {
    let mut available_names: Vec<String> = Vec::new();
    let mut from_descriptor: Option<(Value, Option<Value>)> = None;
    for (key, entry) in descriptor_entries(record) {
        if !is_property_descriptor(entry) {
            continue;
        }
        if !available_names.iter().any(|name| name == key) {
            available_names.push(key.clone());
        }
        if from_descriptor.is_none() && key == property {
            let value = entry.get("value").cloned().unwrap_or_else(|| entry.clone());
            from_descriptor = Some((value, Some(entry.clone())));
        }
    }

    let direct = match record.get(property) {
        Some(_) if property == "properties" => None,
        Some(_) if from_descriptor.is_some() && SYNTHESIZED_RECORD_KEYS.contains(&property) => None,
        Some(direct) => Some((direct.clone(), None)),
        None => None,
    };
    let found = direct.or(from_descriptor);

    if available_names.is_empty() {
        if let Some(fields) = record.as_object() {
            available_names.extend(
                fields
                    .keys()
                    .filter(|key| {
                        !key.starts_with('_') && !EXCLUDED_RECORD_KEYS.contains(&key.as_str())
                    })
                    .cloned(),
            );
        }
    }

    match found {
        Some((value, descriptor)) => PropertyAnalysis {
            exists: true,
            inferred_type: infer_type(property, Some(&value)),
            available_names,
            original_value: Some(value),
            descriptor,
        },
        None => PropertyAnalysis {
            exists: false,
            inferred_type: InferredType::Unknown,
            available_names,
            original_value: None,
            descriptor: None,
        },
    }
}

/// Descriptor candidates in lookup order: the nested map at `properties.value` when that is an
/// object, then the flat map at `properties` (minus the `value` key holding the nested map).
fn descriptor_entries(record: &Value) -> impl Iterator<Item = (&String, &Value)> {
    let bag = record.get("properties").and_then(Value::as_object);
    let nested = bag.and_then(|bag| bag.get("value")).and_then(Value::as_object);
    let flat = bag
        .into_iter()
        .flatten()
        .filter(move |(key, _)| nested.is_none() || key.as_str() != "value");
    nested.into_iter().flatten().chain(flat)
}

/// Host-authored descriptors carry `name` or `value` together with at least one of
/// `type`/`displayName`/`readonly`. Anything else (notably `{width, height}`-style value
/// objects a component stores directly) is plain data.
pub fn is_property_descriptor(candidate: &Value) -> bool {
    let Some(fields) = candidate.as_object() else {
        return false;
    };
    if fields.keys().all(|key| SIMPLE_VALUE_KEYS.contains(&key.as_str())) {
        return false;
    }
    let has_name_or_value = fields.contains_key("name") || fields.contains_key("value");
    let has_metadata = fields.contains_key("type")
        || fields.contains_key("displayName")
        || fields.contains_key("readonly");
    has_name_or_value && has_metadata
}

pub fn infer_type(property: &str, value: Option<&Value>) -> InferredType {
    let name = property.to_lowercase();
    let has_asset_hint = ASSET_NAME_HINTS.iter().any(|hint| name.contains(hint));
    let has_node_hint = name.contains("node") || name.contains("target");

    match value {
        Some(Value::Array(_)) => {
            if name.contains("node") {
                InferredType::NodeArray
            } else if name.contains("color") {
                InferredType::ColorArray
            } else {
                InferredType::Array
            }
        }
        Some(Value::String(_)) => {
            if has_asset_hint {
                InferredType::Asset
            } else {
                InferredType::String
            }
        }
        Some(Value::Number(_)) => InferredType::Number,
        Some(Value::Bool(_)) => InferredType::Boolean,
        Some(Value::Object(fields)) => {
            let has = |key: &str| fields.contains_key(key);
            if has("r") && has("g") && has("b") {
                InferredType::Color
            } else if has("x") && has("y") {
                if has("z") {
                    InferredType::Vec3
                } else {
                    InferredType::Vec2
                }
            } else if has("width") && has("height") {
                InferredType::Size
            } else if has("uuid") || has("__uuid__") {
                if has_node_hint || has("__id__") {
                    InferredType::Node
                } else {
                    InferredType::Asset
                }
            } else {
                InferredType::Unknown
            }
        }
        Some(Value::Null) | None => {
            if has_asset_hint {
                InferredType::Asset
            } else if has_node_hint {
                InferredType::Node
            } else if name.contains("component") {
                InferredType::Component
            } else {
                InferredType::Unknown
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub name: String,
    pub inferred_type: InferredType,
    pub value: Value,
}

/// Every discoverable property of `record` with its current value.
pub fn list_properties(record: &Value) -> Vec<PropertySummary> {
    let names = analyze(record, "").available_names;
    names
        .into_iter()
        .map(|name| {
            let analysis = analyze(record, &name);
            PropertySummary {
                inferred_type: analysis.inferred_type,
                value: analysis.original_value.unwrap_or(Value::Null),
                name,
            }
        })
        .collect()
}
