// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Vec3;
use crate::reconcile::{ComponentSummary, Dimension, PartialVec3, ReconcileError};

/// Envelope returned by every tool. Domain failures are reported here, never as protocol errors.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// `not_found`, `type_mismatch`, `reference_resolution`, `transport`, `verification`,
    /// `redirect`, `conflict` or `invalid_argument`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ToolOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            instruction: None,
            available: Vec::new(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn failure(err: &ReconcileError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            error_kind: Some(err.kind().as_str().to_owned()),
            instruction: err.instruction(),
            available: err.available().to_vec(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeParams {
    /// Persistent node uuid.
    pub node_uuid: String,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfoResponse {
    pub node_uuid: String,
    pub name: String,
    pub active: bool,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub components: Vec<String>,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeSetTransformParams {
    pub node_uuid: String,
    /// Any subset of `{x, y, z}`; on 2D nodes `z` is forced to 0.
    #[serde(default)]
    pub position: Option<PartialVec3>,
    /// Euler angles in degrees; on 2D nodes only `z` applies.
    #[serde(default)]
    pub rotation: Option<PartialVec3>,
    /// Omitted axes default to 1.
    #[serde(default)]
    pub scale: Option<PartialVec3>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeSetPropertyParams {
    pub node_uuid: String,
    /// `name` or `active`.
    pub property: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentListResponse {
    pub node_uuid: String,
    pub components: Vec<ComponentSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentParams {
    pub node_uuid: String,
    /// Exact component type as reported by `component.list`, e.g. `cc.Label`.
    pub component_type: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSetPropertyParams {
    pub node_uuid: String,
    pub component_type: String,
    pub property: String,
    /// One of: string, number, integer, float, boolean, color, vec2, vec3, size, node,
    /// component, spriteFrame, prefab, asset, nodeArray, colorArray, numberArray, stringArray.
    pub property_type: String,
    /// For `component`, the uuid of the node that carries the referenced component.
    pub value: Value,
}
