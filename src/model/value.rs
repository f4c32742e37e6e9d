// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::ids::{NodeId, SceneLocalId};

/// The value-shape category a caller declares for a property write.
///
/// This is authoritative for coercion. The analyzer's inferred type is a separate, informational
/// value and never overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SemanticType {
    String,
    Number,
    Integer,
    Float,
    Boolean,
    Color,
    Vec2,
    Vec3,
    Size,
    Node,
    Component,
    SpriteFrame,
    Prefab,
    Asset,
    NodeArray,
    ColorArray,
    NumberArray,
    StringArray,
}

impl SemanticType {
    pub const ALL: [SemanticType; 18] = [
        Self::String,
        Self::Number,
        Self::Integer,
        Self::Float,
        Self::Boolean,
        Self::Color,
        Self::Vec2,
        Self::Vec3,
        Self::Size,
        Self::Node,
        Self::Component,
        Self::SpriteFrame,
        Self::Prefab,
        Self::Asset,
        Self::NodeArray,
        Self::ColorArray,
        Self::NumberArray,
        Self::StringArray,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Color => "color",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Size => "size",
            Self::Node => "node",
            Self::Component => "component",
            Self::SpriteFrame => "spriteFrame",
            Self::Prefab => "prefab",
            Self::Asset => "asset",
            Self::NodeArray => "nodeArray",
            Self::ColorArray => "colorArray",
            Self::NumberArray => "numberArray",
            Self::StringArray => "stringArray",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported property type '{0}'")]
pub struct UnsupportedSemanticType(pub String);

impl FromStr for SemanticType {
    type Err = UnsupportedSemanticType;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == trimmed)
            .ok_or_else(|| UnsupportedSemanticType(raw.to_owned()))
    }
}

/// RGBA color, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    /// Formats as `#RRGGBBAA`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    SpriteFrame,
    Prefab,
    Generic,
}

impl AssetKind {
    pub fn wire_type(self) -> &'static str {
        match self {
            Self::SpriteFrame => "cc.SpriteFrame",
            Self::Prefab => "cc.Prefab",
            Self::Generic => "cc.Asset",
        }
    }
}

/// A fully coerced value, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticValue {
    String(String),
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Color(Color),
    Vec2(Vec2),
    Vec3(Vec3),
    Size(Size),
    NodeRef(NodeId),
    ComponentRef {
        scene_local_id: SceneLocalId,
        component_type: String,
    },
    AssetRef {
        uuid: String,
        kind: AssetKind,
    },
    NodeArray(Vec<NodeId>),
    ColorArray(Vec<Color>),
    NumberArray(Vec<f64>),
    StringArray(Vec<String>),
}

impl SemanticValue {
    /// The `value` half of a host dump.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::String(value) => Value::String(value.clone()),
            Self::Number(value) => number_value(*value),
            Self::Integer(value) => Value::from(*value),
            Self::Boolean(value) => Value::Bool(*value),
            Self::Color(color) => color_value(*color),
            Self::Vec2(v) => json!({ "x": number_value(v.x), "y": number_value(v.y) }),
            Self::Vec3(v) => {
                json!({ "x": number_value(v.x), "y": number_value(v.y), "z": number_value(v.z) })
            }
            Self::Size(size) => json!({
                "width": number_value(size.width),
                "height": number_value(size.height),
            }),
            Self::NodeRef(node_id) => json!({ "uuid": node_id.as_str() }),
            Self::ComponentRef { scene_local_id, .. } => json!({ "uuid": scene_local_id.as_str() }),
            Self::AssetRef { uuid, .. } => json!({ "uuid": uuid }),
            Self::NodeArray(nodes) => {
                Value::Array(nodes.iter().map(|id| json!({ "uuid": id.as_str() })).collect())
            }
            Self::ColorArray(colors) => {
                Value::Array(colors.iter().copied().map(color_value).collect())
            }
            Self::NumberArray(values) => {
                Value::Array(values.iter().copied().map(number_value).collect())
            }
            Self::StringArray(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// The `type` half of a host dump.
    pub fn wire_type(&self) -> &str {
        match self {
            Self::String(_) | Self::StringArray(_) => "String",
            Self::Number(_) | Self::NumberArray(_) => "Number",
            Self::Integer(_) => "Integer",
            Self::Boolean(_) => "Boolean",
            Self::Color(_) | Self::ColorArray(_) => "cc.Color",
            Self::Vec2(_) => "cc.Vec2",
            Self::Vec3(_) => "cc.Vec3",
            Self::Size(_) => "cc.Size",
            Self::NodeRef(_) | Self::NodeArray(_) => "cc.Node",
            Self::ComponentRef { component_type, .. } => component_type,
            Self::AssetRef { kind, .. } => kind.wire_type(),
        }
    }

    pub fn to_dump(&self) -> Value {
        json!({ "value": self.to_wire(), "type": self.wire_type() })
    }
}

/// Integral values go out as JSON integers so hosts that distinguish the two see what a human
/// would have typed.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn color_value(color: Color) -> Value {
    json!({ "r": color.r, "g": color.g, "b": color.b, "a": color.a })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_type_parses_every_declared_name() {
        for ty in SemanticType::ALL {
            assert_eq!(ty.as_str().parse::<SemanticType>(), Ok(ty));
        }
    }

    #[test]
    fn semantic_type_rejects_unknown_names() {
        let err = "quaternion".parse::<SemanticType>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported property type 'quaternion'");
        assert!("SpriteFrame".parse::<SemanticType>().is_err());
    }

    #[test]
    fn number_value_keeps_integral_values_integral() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(-0.5), json!(-0.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    #[test]
    fn dump_carries_value_and_type() {
        let value = SemanticValue::ComponentRef {
            scene_local_id: SceneLocalId::new("c-17").expect("scene local id"),
            component_type: "cc.Button".to_owned(),
        };
        assert_eq!(value.to_dump(), json!({ "value": { "uuid": "c-17" }, "type": "cc.Button" }));

        let value = SemanticValue::AssetRef {
            uuid: "sf-1".to_owned(),
            kind: AssetKind::SpriteFrame,
        };
        assert_eq!(
            value.to_dump(),
            json!({ "value": { "uuid": "sf-1" }, "type": "cc.SpriteFrame" })
        );
    }

    #[test]
    fn color_hex_is_upper_case_with_alpha() {
        let color = Color { r: 255, g: 0, b: 10, a: 128 };
        assert_eq!(color.to_hex(), "#FF000A80");
    }
}
