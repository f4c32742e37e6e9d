// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Translates a node uuid into the scene-local id of a component on that node.
//!
//! This is the only place a [`NodeId`] becomes a [`SceneLocalId`], and it always goes through a
//! fresh fetch of the target node.

use serde_json::Value;

use crate::host::HostClient;
use crate::model::{ComponentSnapshot, NodeId, SemanticValue};

use super::analyzer::analyze;
use super::error::ReconcileError;

/// Base markers that say nothing about which concrete component a reference wants.
const GENERIC_BASES: &[&str] = &["cc.Object", "Object", "cc.Component", "Component", ""];

/// The component type a reference property expects, read from its descriptor.
///
/// Checks `type`, then `ctor`, then the first concrete entry of the `extends` ancestry.
pub fn expected_component_type(descriptor: &Value) -> Option<String> {
    let concrete = |value: &Value| {
        value
            .as_str()
            .map(str::trim)
            .filter(|name| !GENERIC_BASES.contains(name))
            .map(str::to_owned)
    };

    descriptor
        .get("type")
        .and_then(concrete)
        .or_else(|| descriptor.get("ctor").and_then(concrete))
        .or_else(|| {
            descriptor
                .get("extends")
                .and_then(Value::as_array)
                .and_then(|ancestry| ancestry.iter().find_map(concrete))
        })
}

pub async fn resolve_component_ref(
    client: &HostClient,
    owner: &ComponentSnapshot,
    property: &str,
    target: &NodeId,
) -> Result<SemanticValue, ReconcileError> {
    let analysis = analyze(&owner.record(), property);
    let expected = analysis
        .descriptor
        .as_ref()
        .and_then(expected_component_type)
        .ok_or_else(|| ReconcileError::ReferenceResolution {
            message: format!(
                "cannot determine which component type '{}.{property}' references: \
                 its metadata has no type, ctor or concrete extends entry",
                owner.component_type()
            ),
            available: Vec::new(),
        })?;

    let target_node = client.query_node(target).await?.ok_or_else(|| {
        ReconcileError::ReferenceResolution {
            message: format!("reference target node {target} not found"),
            available: Vec::new(),
        }
    })?;

    let labels =
        || target_node.components().iter().map(ComponentSnapshot::label).collect::<Vec<_>>();

    let Some(component) = target_node.find_component(&expected) else {
        let available = labels();
        return Err(ReconcileError::ReferenceResolution {
            message: format!(
                "node {target} has no '{expected}' component; available components: {}",
                if available.is_empty() { "(none)".to_owned() } else { available.join(", ") }
            ),
            available,
        });
    };

    let scene_local_id = component.scene_local_id().cloned().ok_or_else(|| {
        ReconcileError::ReferenceResolution {
            message: format!(
                "found '{expected}' on node {target} but the host reported no scene-local id for it"
            ),
            available: labels(),
        }
    })?;

    tracing::debug!(
        node = %target,
        component_type = %expected,
        scene_local_id = %scene_local_id,
        "resolved component reference"
    );
    Ok(SemanticValue::ComponentRef { scene_local_id, component_type: expected })
}
