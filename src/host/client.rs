// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::model::{NodeId, NodeSnapshot, SceneLocalId};

use super::{Transport, TransportError};

pub const SCENE_CHANNEL: &str = "scene";

/// Typed scene queries and commands over an opaque [`Transport`].
///
/// Holds no state besides the transport: every query is a fresh round trip.
#[derive(Clone)]
pub struct HostClient {
    transport: Arc<dyn Transport>,
}

impl HostClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn call(&self, command: &str, args: Vec<Value>) -> Result<Value, TransportError> {
        tracing::debug!(channel = SCENE_CHANNEL, command, "host call");
        let result = self.transport.invoke(SCENE_CHANNEL, command, args).await;
        if let Err(err) = &result {
            tracing::debug!(command, error = %err, "host call failed");
        }
        result
    }

    /// `Ok(None)` when the host does not know the node.
    pub async fn query_node(
        &self,
        node_id: &NodeId,
    ) -> Result<Option<NodeSnapshot>, TransportError> {
        let dump = self.call("query-node", vec![json!(node_id.as_str())]).await?;
        Ok(NodeSnapshot::from_dump(node_id, &dump))
    }

    pub async fn set_property(
        &self,
        node_id: &NodeId,
        path: &str,
        dump: Value,
    ) -> Result<(), TransportError> {
        tracing::info!(node = %node_id, path, "set-property");
        let args = json!({ "uuid": node_id.as_str(), "path": path, "dump": dump });
        self.call("set-property", vec![args]).await?;
        Ok(())
    }

    pub async fn create_component(
        &self,
        node_id: &NodeId,
        component_type: &str,
    ) -> Result<(), TransportError> {
        tracing::info!(node = %node_id, component_type, "create-component");
        self.call(
            "create-component",
            vec![json!({ "uuid": node_id.as_str(), "component": component_type })],
        )
        .await?;
        Ok(())
    }

    pub async fn remove_component(
        &self,
        component_id: &SceneLocalId,
    ) -> Result<(), TransportError> {
        tracing::info!(component = %component_id, "remove-component");
        self.call("remove-component", vec![json!({ "uuid": component_id.as_str() })]).await?;
        Ok(())
    }
}
