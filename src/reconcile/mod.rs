// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reconciliation of caller intent against the host's live scene.
//!
//! Every operation starts from a fresh node snapshot and every mutation is followed by a settle
//! delay and a confirming re-read. Nothing is cached between calls.

pub mod analyzer;
pub mod coerce;
pub mod error;
pub mod lifecycle;
pub mod resolver;
pub mod transform;
pub mod verify;
pub mod writer;

#[cfg(test)]
mod tests;

use std::time::Duration;

use schemars::JsonSchema;
use serde::Serialize;

use crate::host::HostClient;
use crate::model::{NodeId, NodeSnapshot};

pub use analyzer::{analyze, InferredType, PropertyAnalysis, PropertySummary};
pub use coerce::{coerce, Coerced};
pub use error::{ErrorKind, ReconcileError};
pub use lifecycle::{AddOutcome, RemoveOutcome, RENDER_COMPONENTS};
pub use transform::{classify, normalize, Dimension, Normalized, PartialVec3, TransformChannel};
pub use verify::{values_match, VerificationOutcome};
pub use writer::{
    NodePropertyChange, PendingVerification, PropertyChange, PropertyWrite, SetComponentProperty,
    TransformChange, TransformUpdate,
};

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(150);

/// Minimum `rapidfuzz` ratio for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Wait between a mutating call and the re-read that confirms it.
    pub settle_delay: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { settle_delay: DEFAULT_SETTLE_DELAY }
    }
}

impl ReconcileConfig {
    pub fn immediate() -> Self {
        Self { settle_delay: Duration::ZERO }
    }

    pub async fn settle(&self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub component_type: String,
    pub enabled: bool,
    pub scene_local_id: Option<String>,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDetails {
    pub component_type: String,
    pub enabled: bool,
    pub scene_local_id: Option<String>,
    pub properties: Vec<PropertySummary>,
}

/// Entry point for every scene operation.
#[derive(Clone)]
pub struct Reconciler {
    client: HostClient,
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(client: HostClient, config: ReconcileConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &HostClient {
        &self.client
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// A fresh snapshot of `node_id`.
    pub async fn fetch_node(&self, node_id: &NodeId) -> Result<NodeSnapshot, ReconcileError> {
        self.client
            .query_node(node_id)
            .await?
            .ok_or_else(|| ReconcileError::NodeNotFound { node_id: node_id.to_string() })
    }

    pub async fn node_info(
        &self,
        node_id: &NodeId,
    ) -> Result<(NodeSnapshot, Dimension), ReconcileError> {
        let node = self.fetch_node(node_id).await?;
        let dimension = transform::classify_node(&node);
        Ok((node, dimension))
    }

    pub async fn list_components(
        &self,
        node_id: &NodeId,
    ) -> Result<Vec<ComponentSummary>, ReconcileError> {
        let node = self.fetch_node(node_id).await?;
        Ok(node
            .components()
            .iter()
            .map(|component| ComponentSummary {
                component_type: component.component_type().to_owned(),
                enabled: component.enabled(),
                scene_local_id: component.scene_local_id().map(|id| id.to_string()),
                properties: analyze(&component.record(), "").available_names,
            })
            .collect())
    }

    pub async fn component_info(
        &self,
        node_id: &NodeId,
        component_type: &str,
    ) -> Result<ComponentDetails, ReconcileError> {
        let node = self.fetch_node(node_id).await?;
        let component = node
            .find_component(component_type)
            .ok_or_else(|| component_not_found(&node, component_type))?;
        Ok(ComponentDetails {
            component_type: component.component_type().to_owned(),
            enabled: component.enabled(),
            scene_local_id: component.scene_local_id().map(|id| id.to_string()),
            properties: analyzer::list_properties(&component.record()),
        })
    }
}

/// `NotFound` for a component type, with the node's actual types and a close match if any.
pub(crate) fn component_not_found(node: &NodeSnapshot, component_type: &str) -> ReconcileError {
    let available = node.component_types();
    let suggestion = suggest(component_type, available.iter().map(String::as_str));
    ReconcileError::ComponentNotFound {
        node_id: node.node_id().to_string(),
        component_type: component_type.to_owned(),
        available,
        suggestion,
    }
}

/// Closest candidate by `rapidfuzz` ratio, case-insensitive. Advisory only.
pub(crate) fn suggest<'a>(
    needle: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    candidates
        .into_iter()
        .map(|candidate| {
            let ratio = rapidfuzz::fuzz::ratio(needle.chars(), candidate.to_lowercase().chars());
            (ratio, candidate)
        })
        .filter(|(ratio, _)| *ratio >= SUGGESTION_THRESHOLD)
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, candidate)| candidate.to_owned())
}
