// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Idempotent add and exact-match remove of components.

use schemars::JsonSchema;
use serde::Serialize;

use crate::host::TransportError;
use crate::model::NodeId;

use super::{component_not_found, ReconcileError, Reconciler};

/// Components that draw the node; the host tolerates several, but a node should carry at most one.
pub const RENDER_COMPONENTS: &[&str] = &[
    "cc.Sprite",
    "cc.Label",
    "cc.RichText",
    "cc.Graphics",
    "cc.ParticleSystem2D",
    "cc.TiledLayer",
    "cc.MotionStreak",
];

pub fn is_render_component(component_type: &str) -> bool {
    RENDER_COMPONENTS.contains(&component_type)
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    pub component_type: String,
    /// The component was already there and nothing was written.
    pub existing: bool,
    pub scene_local_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveOutcome {
    pub component_type: String,
    pub scene_local_id: String,
}

impl Reconciler {
    pub async fn add_component(
        &self,
        node_id: &NodeId,
        component_type: &str,
    ) -> Result<AddOutcome, ReconcileError> {
        let component_type = component_type.trim();
        if component_type.is_empty() {
            return Err(ReconcileError::InvalidArgument {
                name: "componentType",
                message: "must not be empty".to_owned(),
            });
        }

        let node = self.fetch_node(node_id).await?;
        if let Some(existing) = node.find_component(component_type) {
            tracing::debug!(node = %node_id, component_type, "component already present");
            return Ok(AddOutcome {
                component_type: component_type.to_owned(),
                existing: true,
                scene_local_id: existing.scene_local_id().map(|id| id.to_string()),
            });
        }

        if is_render_component(component_type) {
            let conflict = node
                .components()
                .iter()
                .map(|component| component.component_type())
                .find(|existing| is_render_component(existing));
            if let Some(existing) = conflict {
                return Err(ReconcileError::RenderConflict {
                    node_id: node_id.to_string(),
                    requested: component_type.to_owned(),
                    existing: existing.to_owned(),
                });
            }
        }

        self.client().create_component(node_id, component_type).await?;
        self.config().settle().await;

        let after = self.fetch_node(node_id).await?;
        let added =
            after.find_component(component_type).ok_or_else(|| ReconcileError::Verification {
                message: format!(
                    "host accepted adding '{component_type}' to node {node_id} \
                     but the component is not present afterwards"
                ),
            })?;
        Ok(AddOutcome {
            component_type: component_type.to_owned(),
            existing: false,
            scene_local_id: added.scene_local_id().map(|id| id.to_string()),
        })
    }

    pub async fn remove_component(
        &self,
        node_id: &NodeId,
        component_type: &str,
    ) -> Result<RemoveOutcome, ReconcileError> {
        let node = self.fetch_node(node_id).await?;
        let component = node
            .find_component(component_type)
            .ok_or_else(|| component_not_found(&node, component_type))?;
        let scene_local_id = component.scene_local_id().cloned().ok_or_else(|| {
            TransportError::Protocol(format!(
                "host reported '{component_type}' on node {node_id} without a scene-local id"
            ))
        })?;

        self.client().remove_component(&scene_local_id).await?;
        self.config().settle().await;

        let after = self.fetch_node(node_id).await?;
        let still_present = after
            .components()
            .iter()
            .any(|component| component.scene_local_id() == Some(&scene_local_id));
        if still_present {
            return Err(ReconcileError::Verification {
                message: format!(
                    "host accepted removing '{component_type}' ({scene_local_id}) \
                     from node {node_id} but it is still present"
                ),
            });
        }
        Ok(RemoveOutcome {
            component_type: component_type.to_owned(),
            scene_local_id: scene_local_id.into_string(),
        })
    }
}
