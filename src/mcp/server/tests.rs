// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use crate::host::{HostClient, MemoryHost};
use crate::reconcile::{Dimension, PartialVec3, ReconcileConfig};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

fn demo_server() -> (ScenelinkMcp, Arc<MemoryHost>) {
    let host = Arc::new(MemoryHost::demo());
    let client = HostClient::new(host.clone());
    let server = ScenelinkMcp::new(Reconciler::new(client, ReconcileConfig::immediate()));
    (server, host)
}

fn set_property(
    node_uuid: &str,
    component_type: &str,
    property: &str,
    property_type: &str,
    value: serde_json::Value,
) -> Parameters<ComponentSetPropertyParams> {
    Parameters(ComponentSetPropertyParams {
        node_uuid: node_uuid.to_owned(),
        component_type: component_type.to_owned(),
        property: property.to_owned(),
        property_type: property_type.to_owned(),
        value,
    })
}

fn component(node_uuid: &str, component_type: &str) -> Parameters<ComponentParams> {
    Parameters(ComponentParams {
        node_uuid: node_uuid.to_owned(),
        component_type: component_type.to_owned(),
    })
}

#[test]
fn tools_advertise_descriptions_and_schemas() {
    let tools = ScenelinkMcp::tool_router().list_all();
    let mut seen_names = BTreeSet::new();

    for tool in tools {
        let name = tool.name.to_string();
        assert!(seen_names.insert(name.clone()), "duplicate tool name: {name}");
        assert!(
            tool.description.as_deref().is_some_and(|desc| !desc.trim().is_empty()),
            "tool missing description: {name}"
        );
        assert_eq!(
            tool.input_schema.get("type").and_then(|v| v.as_str()),
            Some("object"),
            "tool with non-object input schema: {name}"
        );
        assert!(tool.output_schema.is_some(), "tool missing output schema: {name}");
    }

    let expected: BTreeSet<String> = [
        "node.info",
        "node.set_transform",
        "node.set_property",
        "component.list",
        "component.info",
        "component.add",
        "component.remove",
        "component.set_property",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    assert_eq!(seen_names, expected);
}

#[test]
fn server_info_enables_tools() {
    let (server, _) = demo_server();
    let info = server.get_info();
    assert!(info.capabilities.tools.is_some());
    let instructions = info.instructions.as_deref().unwrap_or_default();
    assert!(instructions.contains("component.set_property"));
}

#[tokio::test]
async fn set_property_success_envelope_carries_verification() {
    let (server, host) = demo_server();
    let params = set_property("title", "cc.Label", "string", "string", json!("Play"));
    let Json(outcome) = server
        .component_set_property(params)
        .await
        .expect("component.set_property");

    assert!(outcome.success);
    assert_eq!(outcome.message, None);
    let change = outcome.data.expect("data");
    assert!(change.change_verified);
    assert_eq!(change.written, json!({ "value": "Play", "type": "String" }));
    assert_eq!(host.mutation_count(), 1);

    let encoded = serde_json::to_value(ToolOutcome::ok(change)).expect("encode");
    assert_eq!(encoded["data"]["changeVerified"], json!(true));
    assert!(encoded.get("errorKind").is_none());
    assert!(encoded.get("available").is_none());
}

#[tokio::test]
async fn lost_write_succeeds_with_unverified_message() {
    let (server, host) = demo_server();
    host.set_ignore_writes(true);

    let Json(outcome) = server
        .component_set_property(set_property("title", "cc.Label", "fontSize", "number", json!(64)))
        .await
        .expect("component.set_property");

    assert!(outcome.success);
    assert_eq!(outcome.message.as_deref(), Some(UNVERIFIED_MESSAGE));
    let change = outcome.data.expect("data");
    assert!(!change.change_verified);
    assert_eq!(change.verification.actual_value, Some(json!(40)));
}

#[tokio::test]
async fn misspelled_component_fails_with_kind_available_and_instruction() {
    let (server, host) = demo_server();
    let Json(outcome) = server
        .component_set_property(set_property("title", "cc.Lable", "string", "string", json!("x")))
        .await
        .expect("component.set_property");

    assert!(!outcome.success);
    assert!(outcome.data.is_none());
    assert_eq!(outcome.error_kind.as_deref(), Some("not_found"));
    assert_eq!(outcome.available, vec!["cc.UITransform".to_owned(), "cc.Label".to_owned()]);
    assert!(outcome.instruction.as_deref().is_some_and(|hint| hint.contains("'cc.Label'")));
    assert_eq!(host.mutation_count(), 0);
}

#[tokio::test]
async fn unsupported_property_type_is_rejected_before_any_host_call() {
    let (server, host) = demo_server();
    let Json(outcome) = server
        .component_set_property(set_property("title", "cc.Label", "string", "quaternion", json!(1)))
        .await
        .expect("component.set_property");

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind.as_deref(), Some("type_mismatch"));
    assert!(outcome.error.as_deref().is_some_and(|err| err.contains("'quaternion'")));
    assert!(outcome.instruction.as_deref().is_some_and(|hint| hint.contains("spriteFrame")));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn blank_node_uuid_is_an_invalid_argument() {
    let (server, host) = demo_server();
    let Json(outcome) = server
        .component_list(Parameters(NodeParams { node_uuid: "   ".to_owned() }))
        .await
        .expect("component.list");

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind.as_deref(), Some("invalid_argument"));
    assert!(outcome.error.as_deref().is_some_and(|err| err.starts_with("invalid nodeUuid")));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn node_transform_through_component_tool_is_redirected() {
    let (server, host) = demo_server();
    let params = set_property("title", "cc.Node", "position", "vec3", json!({ "x": 1 }));
    let Json(outcome) = server
        .component_set_property(params)
        .await
        .expect("component.set_property");

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind.as_deref(), Some("redirect"));
    assert_eq!(outcome.instruction.as_deref(), Some("Use node.set_transform instead."));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn node_info_reports_dimension_and_components() {
    let (server, _) = demo_server();
    let Json(outcome) = server
        .node_info(Parameters(NodeParams { node_uuid: "title".to_owned() }))
        .await
        .expect("node.info");

    let info = outcome.data.expect("data");
    assert_eq!(info.name, "Title");
    assert_eq!(info.parent.as_deref(), Some("canvas"));
    assert_eq!(info.components, vec!["cc.UITransform".to_owned(), "cc.Label".to_owned()]);
    assert_eq!(info.dimension, Dimension::TwoD);

    let Json(missing) = server
        .node_info(Parameters(NodeParams { node_uuid: "nowhere".to_owned() }))
        .await
        .expect("node.info");
    assert_eq!(missing.error_kind.as_deref(), Some("not_found"));
}

#[tokio::test]
async fn two_d_transform_reports_discarded_axes_as_message() {
    let (server, host) = demo_server();
    let Json(outcome) = server
        .node_set_transform(Parameters(NodeSetTransformParams {
            node_uuid: "title".to_owned(),
            position: Some(PartialVec3 { x: Some(10.0), y: Some(20.0), z: Some(7.0) }),
            rotation: None,
            scale: None,
        }))
        .await
        .expect("node.set_transform");

    assert!(outcome.success);
    assert!(outcome.message.as_deref().is_some_and(|msg| msg.contains("z=7")));
    let change = outcome.data.expect("data");
    assert!(change.change_verified);
    let position = host.node("title").expect("title").position;
    assert_eq!((position.x, position.y, position.z), (10.0, 20.0, 0.0));
}

#[tokio::test]
async fn add_is_idempotent_and_remove_verifies_absence() {
    let (server, host) = demo_server();

    let Json(again) = server.component_add(component("title", "cc.Label")).await.expect("add");
    assert!(again.data.as_ref().is_some_and(|added| added.existing));
    assert_eq!(host.mutation_count(), 0);

    let Json(conflict) = server.component_add(component("title", "cc.Sprite")).await.expect("add");
    assert_eq!(conflict.error_kind.as_deref(), Some("conflict"));

    let Json(removed) =
        server.component_remove(component("title", "cc.Label")).await.expect("remove");
    assert!(removed.success);
    let Json(added) = server.component_add(component("title", "cc.Sprite")).await.expect("add");
    let added = added.data.expect("data");
    assert!(!added.existing);
    assert!(added.scene_local_id.is_some());
}
