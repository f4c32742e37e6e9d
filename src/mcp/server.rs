// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};

use crate::model::{NodeId, SemanticType};
use crate::reconcile::{
    AddOutcome, ComponentDetails, NodePropertyChange, PropertyChange, ReconcileError, Reconciler,
    RemoveOutcome, SetComponentProperty, TransformChange, TransformUpdate,
};

use super::types::*;

#[derive(Clone)]
pub struct ScenelinkMcp {
    reconciler: Reconciler,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScenelinkMcp {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler, tool_router: Self::tool_router() }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    /// Read a node: name, active flag, transform, component types, and whether it is treated as
    /// 2D or 3D.
    #[tool(name = "node.info")]
    async fn node_info(
        &self,
        params: Parameters<NodeParams>,
    ) -> Result<Json<ToolOutcome<NodeInfoResponse>>, ErrorData> {
        let NodeParams { node_uuid } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            let (node, dimension) = self.reconciler.node_info(&node_id).await?;
            Ok::<_, ReconcileError>(node_info_response(&node, dimension))
        }
        .await;
        Ok(Json(outcome("node.info", result)))
    }

    /// Set position, rotation and/or scale. On 2D nodes position z and rotation x/y are
    /// discarded with a warning.
    #[tool(name = "node.set_transform")]
    async fn node_set_transform(
        &self,
        params: Parameters<NodeSetTransformParams>,
    ) -> Result<Json<ToolOutcome<TransformChange>>, ErrorData> {
        let NodeSetTransformParams { node_uuid, position, rotation, scale } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            self.reconciler
                .set_node_transform(&node_id, TransformUpdate { position, rotation, scale })
                .await
        }
        .await;

        let response = outcome("node.set_transform", result);
        let message = response.data.as_ref().and_then(|change| {
            if !change.change_verified {
                Some(UNVERIFIED_MESSAGE.to_owned())
            } else if !change.warnings.is_empty() {
                Some(change.warnings.join("; "))
            } else {
                None
            }
        });
        Ok(Json(match message {
            Some(message) => response.with_message(message),
            None => response,
        }))
    }

    /// Set a node's `name` (string) or `active` (boolean).
    #[tool(name = "node.set_property")]
    async fn node_set_property(
        &self,
        params: Parameters<NodeSetPropertyParams>,
    ) -> Result<Json<ToolOutcome<NodePropertyChange>>, ErrorData> {
        let NodeSetPropertyParams { node_uuid, property, value } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            self.reconciler.set_node_property(&node_id, property.trim(), &value).await
        }
        .await;

        let response = outcome("node.set_property", result);
        let unverified = response.data.as_ref().is_some_and(|change| !change.change_verified);
        Ok(Json(if unverified { response.with_message(UNVERIFIED_MESSAGE) } else { response }))
    }

    /// List a node's components with their scene-local ids and discoverable property names;
    /// start here before `component.set_property`.
    #[tool(name = "component.list")]
    async fn component_list(
        &self,
        params: Parameters<NodeParams>,
    ) -> Result<Json<ToolOutcome<ComponentListResponse>>, ErrorData> {
        let NodeParams { node_uuid } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            let components = self.reconciler.list_components(&node_id).await?;
            Ok::<_, ReconcileError>(ComponentListResponse {
                node_uuid: node_id.into_string(),
                components,
            })
        }
        .await;
        Ok(Json(outcome("component.list", result)))
    }

    /// Read every discoverable property of one component with its inferred type and value.
    #[tool(name = "component.info")]
    async fn component_info(
        &self,
        params: Parameters<ComponentParams>,
    ) -> Result<Json<ToolOutcome<ComponentDetails>>, ErrorData> {
        let ComponentParams { node_uuid, component_type } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            self.reconciler.component_info(&node_id, component_type.trim()).await
        }
        .await;
        Ok(Json(outcome("component.info", result)))
    }

    /// Add a component. Idempotent: adding a type that is already present reports
    /// `existing: true` and writes nothing. A node hosts at most one rendering component.
    #[tool(name = "component.add")]
    async fn component_add(
        &self,
        params: Parameters<ComponentParams>,
    ) -> Result<Json<ToolOutcome<AddOutcome>>, ErrorData> {
        let ComponentParams { node_uuid, component_type } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            self.reconciler.add_component(&node_id, &component_type).await
        }
        .await;
        Ok(Json(outcome("component.add", result)))
    }

    /// Remove the first component whose type matches exactly.
    #[tool(name = "component.remove")]
    async fn component_remove(
        &self,
        params: Parameters<ComponentParams>,
    ) -> Result<Json<ToolOutcome<RemoveOutcome>>, ErrorData> {
        let ComponentParams { node_uuid, component_type } = params.0;
        let result = async {
            let node_id = parse_node_id(&node_uuid)?;
            self.reconciler.remove_component(&node_id, &component_type).await
        }
        .await;
        Ok(Json(outcome("component.remove", result)))
    }

    /// Set one component property. The value is coerced to `propertyType`, written, and
    /// re-read; `changeVerified` reports whether the re-read matched.
    #[tool(name = "component.set_property")]
    async fn component_set_property(
        &self,
        params: Parameters<ComponentSetPropertyParams>,
    ) -> Result<Json<ToolOutcome<PropertyChange>>, ErrorData> {
        let ComponentSetPropertyParams {
            node_uuid,
            component_type,
            property,
            property_type,
            value,
        } = params.0;
        let result = async {
            let request = SetComponentProperty {
                node_id: parse_node_id(&node_uuid)?,
                component_type: component_type.trim().to_owned(),
                property: property.trim().to_owned(),
                property_type: parse_semantic_type(&property_type)?,
                value,
            };
            self.reconciler.set_component_property(request).await
        }
        .await;

        let response = outcome("component.set_property", result);
        let unverified = response.data.as_ref().is_some_and(|change| !change.change_verified);
        Ok(Json(if unverified { response.with_message(UNVERIFIED_MESSAGE) } else { response }))
    }
}

#[tool_handler]
impl ServerHandler for ScenelinkMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Scenelink scene editing server (tools: node.info, node.set_transform, \
                 node.set_property, component.list, component.info, component.add, \
                 component.remove, component.set_property)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// Argument parsing and response mapping for MCP tool handlers.
include!("server/helpers.rs");

#[cfg(test)]
mod tests;
