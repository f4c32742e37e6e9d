// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Property writes: components, node basics, and node transforms.
//!
//! A component write is an explicit two-phase protocol. [`PropertyWrite::apply`] issues the
//! `set-property` call and hands back a [`PendingVerification`]; only that value can run the
//! settle-then-re-read step, so a write can't be verified before it was sent.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::host::HostClient;
use crate::model::{NodeId, SemanticType, SemanticValue, Vec3};

use super::analyzer::{analyze, InferredType};
use super::coerce::{coerce, Coerced};
use super::resolver::resolve_component_ref;
use super::transform::{classify_node, normalize, Dimension, PartialVec3, TransformChannel};
use super::verify::{verify, VerificationOutcome};
use super::{component_not_found, ReconcileConfig, ReconcileError, Reconciler};

const NODE_COMPONENT_TYPES: &[&str] = &["cc.Node", "Node"];
const NODE_BASIC_PROPERTIES: &[&str] =
    &["name", "active", "layer", "mobility", "parent", "children", "hideFlags"];
const NODE_TRANSFORM_PROPERTIES: &[&str] =
    &["position", "rotation", "scale", "eulerAngles", "angle"];

/// Transform axes closer than this count as applied.
const TRANSFORM_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct SetComponentProperty {
    pub node_id: NodeId,
    pub component_type: String,
    pub property: String,
    pub property_type: SemanticType,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PropertyChange {
    pub node_id: String,
    pub component_type: String,
    pub property: String,
    pub property_type: String,
    pub inferred_type: InferredType,
    /// The `{value, type}` dump that was sent.
    pub written: Value,
    pub change_verified: bool,
    pub verification: VerificationOutcome,
}

/// A component property write that has not been sent yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyWrite {
    node_id: NodeId,
    component_type: String,
    component_index: usize,
    property: String,
    before: Option<Value>,
    value: SemanticValue,
}

impl PropertyWrite {
    pub fn path(&self) -> String {
        format!("__comps__.{}.{}", self.component_index, self.property)
    }

    pub fn value(&self) -> &SemanticValue {
        &self.value
    }

    pub async fn apply(self, client: &HostClient) -> Result<PendingVerification, ReconcileError> {
        client.set_property(&self.node_id, &self.path(), self.value.to_dump()).await?;
        Ok(PendingVerification { write: self })
    }
}

/// A write the host accepted, awaiting its confirming re-read.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVerification {
    write: PropertyWrite,
}

impl PendingVerification {
    pub async fn verify(
        self,
        client: &HostClient,
        config: &ReconcileConfig,
    ) -> VerificationOutcome {
        config.settle().await;
        let PropertyWrite { node_id, component_type, property, before, value, .. } = self.write;
        verify(client, &node_id, &component_type, &property, before, value.to_wire()).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodePropertyChange {
    pub node_id: String,
    pub property: String,
    pub value: Value,
    pub before_value: Value,
    pub actual_value: Option<Value>,
    pub change_verified: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct TransformUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PartialVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<PartialVec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<PartialVec3>,
}

impl TransformUpdate {
    fn channels(&self) -> impl Iterator<Item = (TransformChannel, PartialVec3)> + '_ {
        TransformChannel::ALL.into_iter().filter_map(|channel| {
            let input = match channel {
                TransformChannel::Position => self.position,
                TransformChannel::Rotation => self.rotation,
                TransformChannel::Scale => self.scale,
            };
            input.map(|input| (channel, input))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedTransform {
    pub channel: String,
    pub value: Vec3,
    pub actual: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformChange {
    pub node_id: String,
    pub dimension: Dimension,
    pub applied: Vec<AppliedTransform>,
    pub warnings: Vec<String>,
    pub change_verified: bool,
}

fn redirect_for(property: &str) -> Option<&'static str> {
    if NODE_BASIC_PROPERTIES.contains(&property) {
        Some("node.set_property")
    } else if NODE_TRANSFORM_PROPERTIES.contains(&property) {
        Some("node.set_transform")
    } else {
        None
    }
}

impl Reconciler {
    /// Redirect check, read, analyze, coerce, resolve, write, settle, verify.
    pub async fn set_component_property(
        &self,
        request: SetComponentProperty,
    ) -> Result<PropertyChange, ReconcileError> {
        let SetComponentProperty {
            node_id,
            component_type,
            property,
            property_type,
            value,
        } = request;

        let addresses_node = NODE_COMPONENT_TYPES.contains(&component_type.as_str());
        if addresses_node {
            if let Some(tool) = redirect_for(&property) {
                return Err(ReconcileError::Redirect { property, tool });
            }
        }

        let node = self.fetch_node(&node_id).await?;
        if addresses_node {
            return Err(component_not_found(&node, &component_type));
        }
        let component = node
            .find_component(&component_type)
            .ok_or_else(|| component_not_found(&node, &component_type))?;

        let analysis = analyze(&component.record(), &property);
        if !analysis.exists {
            return Err(ReconcileError::PropertyNotFound {
                component_type,
                property,
                available: analysis.available_names,
            });
        }
        if analysis.inferred_type != InferredType::Unknown
            && analysis.inferred_type.as_str() != property_type.as_str()
        {
            tracing::debug!(
                property = %property,
                declared = %property_type,
                inferred = analysis.inferred_type.as_str(),
                "declared type differs from inferred type"
            );
        }

        let semantic = match coerce(property_type, &value, analysis.original_value.as_ref())? {
            Coerced::Value(semantic) => semantic,
            Coerced::ComponentTarget(target) => {
                resolve_component_ref(self.client(), component, &property, &target).await?
            }
        };

        let write = PropertyWrite {
            node_id: node_id.clone(),
            component_type: component_type.clone(),
            component_index: component.index(),
            property: property.clone(),
            before: analysis.original_value,
            value: semantic,
        };
        let written = write.value().to_dump();
        let pending = write.apply(self.client()).await?;
        let verification = pending.verify(self.client(), self.config()).await;

        Ok(PropertyChange {
            node_id: node_id.into_string(),
            component_type,
            property,
            property_type: property_type.as_str().to_owned(),
            inferred_type: analysis.inferred_type,
            written,
            change_verified: verification.verified,
            verification,
        })
    }

    /// Sets `name` or `active` on a node.
    pub async fn set_node_property(
        &self,
        node_id: &NodeId,
        property: &str,
        value: &Value,
    ) -> Result<NodePropertyChange, ReconcileError> {
        let declared = match property {
            "name" => SemanticType::String,
            "active" => SemanticType::Boolean,
            other if NODE_TRANSFORM_PROPERTIES.contains(&other) => {
                return Err(ReconcileError::Redirect {
                    property: other.to_owned(),
                    tool: "node.set_transform",
                });
            }
            other => {
                return Err(ReconcileError::InvalidArgument {
                    name: "property",
                    message: format!("'{other}' cannot be set here; supported: name, active"),
                });
            }
        };

        let node = self.fetch_node(node_id).await?;
        let before = match declared {
            SemanticType::String => json!(node.name()),
            _ => json!(node.active()),
        };
        let Coerced::Value(semantic) = coerce(declared, value, Some(&before))? else {
            return Err(ReconcileError::type_mismatch(declared, "expected a plain value"));
        };
        let wire = semantic.to_wire();

        self.client().set_property(node_id, property, semantic.to_dump()).await?;
        self.config().settle().await;

        let actual = match self.client().query_node(node_id).await {
            Ok(Some(after)) => Some(match declared {
                SemanticType::String => json!(after.name()),
                _ => json!(after.active()),
            }),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(node = %node_id, error = %err, "verification re-read failed");
                None
            }
        };
        let change_verified = actual.as_ref() == Some(&wire);
        Ok(NodePropertyChange {
            node_id: node_id.to_string(),
            property: property.to_owned(),
            value: wire,
            before_value: before,
            actual_value: actual,
            change_verified,
        })
    }

    /// Classifies the node, projects each supplied vector onto its meaningful axes, writes them,
    /// and confirms them with one re-read.
    pub async fn set_node_transform(
        &self,
        node_id: &NodeId,
        update: TransformUpdate,
    ) -> Result<TransformChange, ReconcileError> {
        if update.channels().next().is_none() {
            return Err(ReconcileError::InvalidArgument {
                name: "transform",
                message: "supply at least one of position, rotation, scale".to_owned(),
            });
        }

        let node = self.fetch_node(node_id).await?;
        let dimension = classify_node(&node);

        let mut applied = Vec::new();
        let mut warnings = Vec::new();
        for (channel, input) in update.channels() {
            let normalized = normalize(input, channel, dimension);
            if let Some(warning) = normalized.warning {
                tracing::warn!(node = %node_id, channel = channel.as_str(), "{warning}");
                warnings.push(warning);
            }
            let dump = SemanticValue::Vec3(normalized.value).to_dump();
            self.client().set_property(node_id, channel.as_str(), dump).await?;
            applied.push((channel, normalized.value));
        }
        self.config().settle().await;

        let after = match self.client().query_node(node_id).await {
            Ok(after) => after,
            Err(err) => {
                tracing::warn!(node = %node_id, error = %err, "verification re-read failed");
                None
            }
        };
        let applied = applied
            .into_iter()
            .map(|(channel, value)| {
                let actual = after.as_ref().map(|after| match channel {
                    TransformChannel::Position => after.position(),
                    TransformChannel::Rotation => after.rotation(),
                    TransformChannel::Scale => after.scale(),
                });
                AppliedTransform { channel: channel.as_str().to_owned(), value, actual }
            })
            .collect::<Vec<_>>();
        let change_verified = applied
            .iter()
            .all(|entry| entry.actual.is_some_and(|actual| vec3_close(actual, entry.value)));

        Ok(TransformChange {
            node_id: node_id.to_string(),
            dimension,
            applied,
            warnings,
            change_verified,
        })
    }
}

fn vec3_close(a: Vec3, b: Vec3) -> bool {
    (a.x - b.x).abs() < TRANSFORM_TOLERANCE
        && (a.y - b.y).abs() < TRANSFORM_TOLERANCE
        && (a.z - b.z).abs() < TRANSFORM_TOLERANCE
}
