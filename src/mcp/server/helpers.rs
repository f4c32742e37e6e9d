// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

const UNVERIFIED_MESSAGE: &str =
    "The host accepted the write but a re-read shows a different value; \
     re-check with a read tool or retry.";

fn parse_node_id(raw: &str) -> Result<NodeId, ReconcileError> {
    NodeId::new(raw.trim()).map_err(|err| ReconcileError::InvalidArgument {
        name: "nodeUuid",
        message: err.to_string(),
    })
}

fn parse_semantic_type(raw: &str) -> Result<SemanticType, ReconcileError> {
    raw.parse::<SemanticType>()
        .map_err(|err| ReconcileError::UnsupportedType { declared: err.0 })
}

fn outcome<T>(tool: &str, result: Result<T, ReconcileError>) -> ToolOutcome<T> {
    match result {
        Ok(data) => ToolOutcome::ok(data),
        Err(err) => {
            tracing::info!(tool, kind = err.kind().as_str(), error = %err, "tool failed");
            ToolOutcome::failure(&err)
        }
    }
}

fn node_info_response(
    node: &crate::model::NodeSnapshot,
    dimension: crate::reconcile::Dimension,
) -> NodeInfoResponse {
    NodeInfoResponse {
        node_uuid: node.node_id().to_string(),
        name: node.name().to_owned(),
        active: node.active(),
        position: node.position(),
        rotation: node.rotation(),
        scale: node.scale(),
        parent: node.parent().map(ToString::to_string),
        children: node.children().iter().map(ToString::to_string).collect(),
        components: node.component_types(),
        dimension,
    }
}
