// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! 2D/3D classification of nodes and projection of partial transform vectors.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{NodeSnapshot, Vec3};

const EPSILON: f64 = 0.001;

const MARKERS_2D: &[&str] = &["Sprite", "Label", "Button", "Layout", "Widget", "Mask", "Graphics"];
const MARKERS_3D: &[&str] =
    &["MeshRenderer", "Camera", "Light", "DirectionalLight", "PointLight", "SpotLight"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub enum Dimension {
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TwoD => "2D",
            Self::ThreeD => "3D",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformChannel {
    Position,
    Rotation,
    Scale,
}

impl TransformChannel {
    pub const ALL: [TransformChannel; 3] = [Self::Position, Self::Rotation, Self::Scale];

    /// Also the node property path the channel is written to.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        }
    }

    fn default_axis(self) -> f64 {
        match self {
            Self::Position | Self::Rotation => 0.0,
            Self::Scale => 1.0,
        }
    }
}

/// A transform vector with any subset of axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct PartialVec3 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub value: Vec3,
    pub warning: Option<String>,
}

fn matches_marker(component_type: &str, markers: &[&str]) -> bool {
    let bare = component_type.strip_prefix("cc.").unwrap_or(component_type);
    markers.contains(&bare)
}

/// Pure in the component types and the z position; first decisive signal wins.
pub fn classify<S: AsRef<str>>(component_types: &[S], position_z: f64) -> Dimension {
    if component_types.iter().any(|ty| matches_marker(ty.as_ref(), MARKERS_2D)) {
        return Dimension::TwoD;
    }
    if component_types.iter().any(|ty| matches_marker(ty.as_ref(), MARKERS_3D)) {
        return Dimension::ThreeD;
    }
    if position_z.abs() < EPSILON {
        Dimension::TwoD
    } else {
        Dimension::ThreeD
    }
}

pub fn classify_node(node: &NodeSnapshot) -> Dimension {
    classify(node.component_types().as_slice(), node.position().z)
}

pub fn normalize(
    input: PartialVec3,
    channel: TransformChannel,
    dimension: Dimension,
) -> Normalized {
    let default = channel.default_axis();
    let mut value = Vec3 {
        x: input.x.unwrap_or(default),
        y: input.y.unwrap_or(default),
        z: input.z.unwrap_or(default),
    };
    if dimension == Dimension::ThreeD {
        return Normalized { value, warning: None };
    }

    let warning = match channel {
        TransformChannel::Position => {
            value.z = 0.0;
            input
                .z
                .filter(|z| z.abs() > EPSILON)
                .map(|z| format!("2D node: position z={z} was discarded, z is fixed at 0"))
        }
        TransformChannel::Rotation => {
            let discarded = [("x", input.x), ("y", input.y)]
                .into_iter()
                .filter_map(|(axis, v)| {
                    v.filter(|v| v.abs() > EPSILON).map(|v| format!("{axis}={v}"))
                })
                .collect::<Vec<_>>();
            if discarded.is_empty() {
                None
            } else {
                value.x = 0.0;
                value.y = 0.0;
                Some(format!(
                    "2D node: rotation {} was discarded, only z rotation applies",
                    discarded.join(", ")
                ))
            }
        }
        TransformChannel::Scale => None,
    };
    Normalized { value, warning }
}
