// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Declared-type-directed conversion of caller JSON into [`SemanticValue`]s.
//!
//! Coercion is idempotent: feeding a value's own wire form back in yields the same value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::model::{AssetKind, Color, NodeId, SemanticType, SemanticValue, Size, Vec2, Vec3};

use super::error::ReconcileError;

/// Result of coercion.
///
/// Component references cannot be completed without a live lookup; coercion stops at the target
/// node and leaves the rest to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Value(SemanticValue),
    ComponentTarget(NodeId),
}

pub fn coerce(
    declared: SemanticType,
    raw: &Value,
    original: Option<&Value>,
) -> Result<Coerced, ReconcileError> {
    let value = match declared {
        SemanticType::String => SemanticValue::String(to_string(declared, raw)?),
        SemanticType::Number | SemanticType::Float => {
            SemanticValue::Number(to_number(declared, raw)?)
        }
        SemanticType::Integer => SemanticValue::Integer(to_number(declared, raw)?.trunc() as i64),
        SemanticType::Boolean => SemanticValue::Boolean(to_bool(raw)),
        SemanticType::Color => SemanticValue::Color(to_color(raw, original)?),
        SemanticType::Vec2 => {
            let fields = require_object(declared, raw)?;
            SemanticValue::Vec2(Vec2 {
                x: field_or(fields, original, "x", 0.0),
                y: field_or(fields, original, "y", 0.0),
            })
        }
        SemanticType::Vec3 => {
            let fields = require_object(declared, raw)?;
            SemanticValue::Vec3(Vec3 {
                x: field_or(fields, original, "x", 0.0),
                y: field_or(fields, original, "y", 0.0),
                z: field_or(fields, original, "z", 0.0),
            })
        }
        SemanticType::Size => {
            let fields = require_object(declared, raw)?;
            SemanticValue::Size(Size {
                width: field_or(fields, original, "width", 100.0),
                height: field_or(fields, original, "height", 100.0),
            })
        }
        SemanticType::Node => SemanticValue::NodeRef(to_node_id(declared, raw)?),
        SemanticType::SpriteFrame => to_asset(declared, raw, AssetKind::SpriteFrame)?,
        SemanticType::Prefab => to_asset(declared, raw, AssetKind::Prefab)?,
        SemanticType::Asset => to_asset(declared, raw, AssetKind::Generic)?,
        SemanticType::Component => {
            let Value::String(raw_id) = raw else {
                let message = format!(
                    "expected the uuid of the node carrying the component, got {}",
                    describe(raw)
                );
                return Err(ReconcileError::type_mismatch(declared, message));
            };
            let node_id = NodeId::new(raw_id.as_str())
                .map_err(|err| ReconcileError::type_mismatch(declared, err.to_string()))?;
            return Ok(Coerced::ComponentTarget(node_id));
        }
        SemanticType::NodeArray => {
            let items = require_array(declared, raw)?;
            let nodes = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    to_node_id(SemanticType::Node, item)
                        .map_err(|err| element_error(declared, index, err))
                })
                .collect::<Result<Vec<_>, _>>()?;
            SemanticValue::NodeArray(nodes)
        }
        SemanticType::ColorArray => {
            let items = require_array(declared, raw)?;
            let colors = items
                .iter()
                .map(|item| to_color(item, None).unwrap_or(Color::WHITE))
                .collect();
            SemanticValue::ColorArray(colors)
        }
        SemanticType::NumberArray => {
            let items = require_array(declared, raw)?;
            let numbers = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    to_number(SemanticType::Number, item)
                        .map_err(|err| element_error(declared, index, err))
                })
                .collect::<Result<Vec<_>, _>>()?;
            SemanticValue::NumberArray(numbers)
        }
        SemanticType::StringArray => {
            let items = require_array(declared, raw)?;
            let strings = items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    to_string(SemanticType::String, item)
                        .map_err(|err| element_error(declared, index, err))
                })
                .collect::<Result<Vec<_>, _>>()?;
            SemanticValue::StringArray(strings)
        }
    };
    Ok(Coerced::Value(value))
}

fn to_string(declared: SemanticType, raw: &Value) -> Result<String, ReconcileError> {
    match raw {
        Value::String(value) => Ok(value.clone()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(number) => Ok(match number.as_f64() {
            Some(value) => format_number(value),
            None => number.to_string(),
        }),
        other => Err(ReconcileError::type_mismatch(
            declared,
            format!("expected a scalar, got {}", describe(other)),
        )),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{}", value as i128)
    } else {
        value.to_string()
    }
}

fn to_number(declared: SemanticType, raw: &Value) -> Result<f64, ReconcileError> {
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|value| value.is_finite()).ok_or_else(|| {
        ReconcileError::type_mismatch(declared, format!("{} is not a number", describe(raw)))
    })
}

fn to_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(value) => *value,
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed.eq_ignore_ascii_case("true") || trimmed == "1"
        }
        Value::Number(number) => {
            number.as_f64().is_some_and(|value| value != 0.0 && !value.is_nan())
        }
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn hex_color_regex() -> Option<&'static Regex> {
    static HEX: OnceLock<Option<Regex>> = OnceLock::new();
    HEX.get_or_init(|| Regex::new(r"^#([0-9A-Fa-f]{6})([0-9A-Fa-f]{2})?$").ok())
        .as_ref()
}

fn to_color(raw: &Value, original: Option<&Value>) -> Result<Color, ReconcileError> {
    match raw {
        Value::String(text) => {
            let captures = hex_color_regex().and_then(|hex| hex.captures(text)).ok_or_else(|| {
                ReconcileError::type_mismatch(
                    SemanticType::Color,
                    format!("'{text}' is not a #RRGGBB or #RRGGBBAA color"),
                )
            })?;
            let rgb = &captures[1];
            let channel = |hex: &str| u8::from_str_radix(hex, 16).unwrap_or(u8::MAX);
            Ok(Color {
                r: channel(&rgb[0..2]),
                g: channel(&rgb[2..4]),
                b: channel(&rgb[4..6]),
                a: captures.get(2).map(|alpha| channel(alpha.as_str())).unwrap_or(u8::MAX),
            })
        }
        Value::Object(fields) => {
            let channel = |key: &str| -> Result<u8, ReconcileError> {
                match fields.get(key) {
                    None | Some(Value::Null) => Ok(original
                        .and_then(|original| original.get(key))
                        .and_then(Value::as_f64)
                        .map(clamp_channel)
                        .unwrap_or(u8::MAX)),
                    Some(value) => value.as_f64().map(clamp_channel).ok_or_else(|| {
                        ReconcileError::type_mismatch(
                            SemanticType::Color,
                            format!("channel '{key}' is {}", describe(value)),
                        )
                    }),
                }
            };
            Ok(Color {
                r: channel("r")?,
                g: channel("g")?,
                b: channel("b")?,
                a: channel("a")?,
            })
        }
        other => Err(ReconcileError::type_mismatch(
            SemanticType::Color,
            format!("expected a hex string or an {{r, g, b, a}} object, got {}", describe(other)),
        )),
    }
}

fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return u8::MAX;
    }
    value.clamp(0.0, 255.0).round() as u8
}

fn field_or(
    fields: &serde_json::Map<String, Value>,
    original: Option<&Value>,
    key: &str,
    default: f64,
) -> f64 {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .or_else(|| original.and_then(|original| original.get(key)).and_then(Value::as_f64))
        .unwrap_or(default)
}

/// Accepts a bare uuid string or an already-wrapped `{uuid}` reference.
fn reference_uuid(raw: &Value) -> Option<&str> {
    match raw {
        Value::String(uuid) => Some(uuid.as_str()),
        Value::Object(fields) => fields
            .get("uuid")
            .or_else(|| fields.get("__uuid__"))
            .and_then(Value::as_str),
        _ => None,
    }
}

fn to_node_id(declared: SemanticType, raw: &Value) -> Result<NodeId, ReconcileError> {
    let uuid = reference_uuid(raw).ok_or_else(|| {
        let message = format!("expected a uuid string, got {}", describe(raw));
        ReconcileError::type_mismatch(declared, message)
    })?;
    NodeId::new(uuid).map_err(|err| ReconcileError::type_mismatch(declared, err.to_string()))
}

fn to_asset(
    declared: SemanticType,
    raw: &Value,
    kind: AssetKind,
) -> Result<SemanticValue, ReconcileError> {
    match reference_uuid(raw) {
        Some(uuid) if !uuid.trim().is_empty() => Ok(SemanticValue::AssetRef {
            uuid: uuid.to_owned(),
            kind,
        }),
        _ => Err(ReconcileError::type_mismatch(
            declared,
            format!("expected an asset uuid string, got {}", describe(raw)),
        )),
    }
}

fn require_object(
    declared: SemanticType,
    raw: &Value,
) -> Result<&serde_json::Map<String, Value>, ReconcileError> {
    raw.as_object().ok_or_else(|| {
        let message = format!("expected an object, got {}", describe(raw));
        ReconcileError::type_mismatch(declared, message)
    })
}

fn require_array(declared: SemanticType, raw: &Value) -> Result<&Vec<Value>, ReconcileError> {
    raw.as_array().ok_or_else(|| {
        ReconcileError::type_mismatch(declared, format!("expected an array, got {}", describe(raw)))
    })
}

fn element_error(declared: SemanticType, index: usize, err: ReconcileError) -> ReconcileError {
    let message = match err {
        ReconcileError::TypeMismatch { message, .. } => message,
        other => other.to_string(),
    };
    ReconcileError::type_mismatch(declared, format!("element {index}: {message}"))
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(_) => "a boolean".to_owned(),
        Value::Number(number) => format!("the number {number}"),
        Value::String(text) => format!("the string '{text}'"),
        Value::Array(_) => "an array".to_owned(),
        Value::Object(_) => "an object".to_owned(),
    }
}
