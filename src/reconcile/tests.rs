// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use super::*;
use crate::host::{HostComponent, HostNode, MemoryHost};
use crate::model::{SemanticType, Vec3};

struct Scene {
    host: Arc<MemoryHost>,
    reconciler: Reconciler,
}

impl Scene {
    fn commands(&self) -> Vec<String> {
        self.host.calls().into_iter().map(|call| call.command).collect()
    }
}

#[fixture]
fn scene() -> Scene {
    let host = Arc::new(MemoryHost::demo());
    host.insert_node(
        "linker",
        HostNode::new("Linker").with_component(HostComponent::new("game.Linker").with_property(
            "button",
            json!({
                "value": null,
                "displayName": "Button",
                "extends": ["cc.Object", "cc.Component", "cc.Button"],
            }),
        )),
    );
    let reconciler = Reconciler::new(HostClient::new(host.clone()), ReconcileConfig::immediate());
    Scene { host, reconciler }
}

fn node(id: &str) -> NodeId {
    NodeId::new(id).expect("node id")
}

fn request(
    node_id: &str,
    component: &str,
    property: &str,
    ty: SemanticType,
    value: Value,
) -> SetComponentProperty {
    SetComponentProperty {
        node_id: node(node_id),
        component_type: component.to_owned(),
        property: property.to_owned(),
        property_type: ty,
        value,
    }
}

#[rstest]
#[tokio::test]
async fn label_string_write_is_verified(scene: Scene) {
    let old = json!({ "value": "Old", "type": "String", "displayName": "String" });
    let label = HostComponent::with_defaults("cc.Label").with_property("string", old);
    scene.host.insert_node("old-label", HostNode::new("OldLabel").with_component(label));

    let write = request("old-label", "cc.Label", "string", SemanticType::String, json!("Hello"));
    let change = scene
        .reconciler
        .set_component_property(write)
        .await
        .expect("set property");

    assert!(change.change_verified);
    assert_eq!(change.written, json!({ "value": "Hello", "type": "String" }));
    assert_eq!(change.verification.before_value, Some(json!("Old")));
    assert_eq!(change.verification.actual_value, Some(json!("Hello")));
    assert_eq!(change.inferred_type, InferredType::String);
    assert_eq!(scene.commands(), vec!["query-node", "set-property", "query-node"]);

    let calls = scene.host.calls();
    assert_eq!(calls[1].args[0]["path"], "__comps__.0.string");
}

#[rstest]
#[tokio::test]
async fn component_ref_to_node_without_expected_type_lists_components(scene: Scene) {
    let write = request("linker", "game.Linker", "button", SemanticType::Component, json!("title"));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceResolution);
    let title = scene.host.node("title").expect("title");
    let expected = title
        .components
        .iter()
        .map(|c| format!("{}({})", c.component_type, c.scene_local_id.clone().unwrap_or_default()))
        .collect::<Vec<_>>();
    assert_eq!(err.available(), expected.as_slice());
    for label in &expected {
        assert!(err.to_string().contains(label.as_str()));
    }
    assert_eq!(scene.host.mutation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn component_ref_resolves_to_scene_local_id(scene: Scene) {
    let bar_id = scene
        .host
        .node("scroll-bar")
        .and_then(|bar| bar.components.into_iter().find(|c| c.component_type == "cc.ScrollBar"))
        .and_then(|bar| bar.scene_local_id)
        .expect("scroll bar id");

    let change = scene
        .reconciler
        .set_component_property(request(
            "scroll-view",
            "cc.ScrollView",
            "verticalScrollBar",
            SemanticType::Component,
            json!("scroll-bar"),
        ))
        .await
        .expect("set reference");

    assert_eq!(change.written, json!({ "value": { "uuid": bar_id }, "type": "cc.ScrollBar" }));
    assert!(change.change_verified);
    assert_eq!(scene.commands(), vec!["query-node", "query-node", "set-property", "query-node"]);
}

#[rstest]
#[tokio::test]
async fn component_ref_to_component_without_id_writes_nothing(scene: Scene) {
    scene.host.insert_node(
        "reloading-bar",
        HostNode::new("ReloadingBar")
            .with_component(HostComponent::new("cc.ScrollBar").without_reported_id()),
    );

    let err = scene
        .reconciler
        .set_component_property(request(
            "scroll-view",
            "cc.ScrollView",
            "verticalScrollBar",
            SemanticType::Component,
            json!("reloading-bar"),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceResolution);
    assert!(err.to_string().contains("no scene-local id"));
    assert_eq!(err.available(), ["cc.ScrollBar(?)".to_owned()]);
    assert_eq!(scene.commands(), vec!["query-node", "query-node"]);
}

#[rstest]
#[tokio::test]
async fn property_named_type_reads_back_its_own_value(scene: Scene) {
    let sprite = HostComponent::with_defaults("cc.Sprite")
        .with_property("type", json!({ "value": 0, "type": "Enum", "displayName": "Type" }));
    scene.host.insert_node("sprite", HostNode::new("Sprite").with_component(sprite));

    let write = request("sprite", "cc.Sprite", "type", SemanticType::Number, json!(1));
    let change = scene
        .reconciler
        .set_component_property(write)
        .await
        .expect("set sprite type");

    assert!(change.change_verified);
    assert_eq!(change.verification.before_value, Some(json!(0)));
    assert_eq!(change.verification.actual_value, Some(json!(1)));
}

#[rstest]
#[case("position", "node.set_transform")]
#[case("eulerAngles", "node.set_transform")]
#[case("name", "node.set_property")]
#[case("active", "node.set_property")]
#[tokio::test]
async fn node_properties_redirect_without_host_calls(
    scene: Scene,
    #[case] property: &str,
    #[case] tool: &str,
) {
    let write = request("title", "cc.Node", property, SemanticType::String, json!("x"));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Redirect);
    assert!(err.instruction().is_some_and(|hint| hint.contains(tool)));
    assert!(scene.host.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn other_node_properties_list_component_types(scene: Scene) {
    let err = scene
        .reconciler
        .set_component_property(request("title", "Node", "opacity", SemanticType::Number, json!(1)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.available(), ["cc.UITransform".to_owned(), "cc.Label".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn misspelled_component_gets_a_suggestion(scene: Scene) {
    let write = request("title", "cc.Lable", "string", SemanticType::String, json!("x"));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();
    match &err {
        ReconcileError::ComponentNotFound { suggestion, .. } => {
            assert_eq!(suggestion.as_deref(), Some("cc.Label"));
        }
        other => panic!("expected ComponentNotFound, got {other:?}"),
    }
    assert_eq!(scene.host.mutation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn missing_property_lists_available_names(scene: Scene) {
    let write = request("title", "cc.Label", "text", SemanticType::String, json!("x"));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.available().contains(&"string".to_owned()));
    assert!(err.available().contains(&"fontSize".to_owned()));
    assert_eq!(scene.host.mutation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn coercion_failure_aborts_before_writing(scene: Scene) {
    let write = request("title", "cc.Label", "color", SemanticType::Color, json!("crimson"));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(scene.host.mutation_count(), 0);
}

#[rstest]
#[tokio::test]
async fn hex_color_lands_as_channels(scene: Scene) {
    let write = request("title", "cc.Label", "color", SemanticType::Color, json!("#FF000080"));
    let change = scene
        .reconciler
        .set_component_property(write)
        .await
        .expect("set color");
    assert_eq!(change.written["value"], json!({ "r": 255, "g": 0, "b": 0, "a": 128 }));
    assert!(change.change_verified);
}

#[rstest]
#[tokio::test]
async fn lost_write_is_reported_not_raised(scene: Scene) {
    scene.host.set_ignore_writes(true);
    let write = request("title", "cc.Label", "fontSize", SemanticType::Number, json!("64"));
    let change = scene
        .reconciler
        .set_component_property(write)
        .await
        .expect("write itself succeeds");

    assert!(!change.change_verified);
    assert_eq!(change.verification.expected_value, json!(64));
    assert_eq!(change.verification.actual_value, Some(json!(40)));
}

#[rstest]
#[tokio::test]
async fn rejected_write_is_a_transport_error(scene: Scene) {
    scene.host.fail_command("set-property", "scene is locked");
    let write = request("title", "cc.Label", "fontSize", SemanticType::Integer, json!(12.7));
    let err = scene
        .reconciler
        .set_component_property(write)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("scene is locked"));
}

#[rstest]
#[tokio::test]
async fn unknown_node_is_not_found(scene: Scene) {
    let err = scene.reconciler.list_components(&node("ghost")).await.unwrap_err();
    assert_eq!(err, ReconcileError::NodeNotFound { node_id: "ghost".to_owned() });
}

#[rstest]
#[tokio::test]
async fn settle_delay_is_honoured(scene: Scene) {
    let reconciler = Reconciler::new(
        scene.reconciler.client().clone(),
        ReconcileConfig { settle_delay: Duration::from_millis(20) },
    );
    let started = std::time::Instant::now();
    let write = request("title", "cc.Label", "string", SemanticType::String, json!("Later"));
    reconciler
        .set_component_property(write)
        .await
        .expect("set property");
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[rstest]
#[tokio::test]
async fn list_and_info_expose_properties(scene: Scene) {
    let components = scene.reconciler.list_components(&node("start-button")).await.expect("list");
    let types = components.iter().map(|c| c.component_type.as_str()).collect::<Vec<_>>();
    assert_eq!(types, vec!["cc.UITransform", "cc.Sprite", "cc.Button"]);
    assert!(components[2].properties.contains(&"interactable".to_owned()));
    assert!(components.iter().all(|c| c.scene_local_id.is_some()));

    let info = scene.reconciler.component_info(&node("title"), "cc.Label").await.expect("info");
    let string = info.properties.iter().find(|p| p.name == "string").expect("string property");
    assert_eq!(string.value, json!("Hello Scenelink"));
    assert_eq!(string.inferred_type, InferredType::String);
}

#[rstest]
#[tokio::test]
async fn transform_on_2d_node_drops_z(scene: Scene) {
    let update = TransformUpdate {
        position: Some(PartialVec3 { x: Some(1.0), y: Some(2.0), z: Some(5.0) }),
        scale: Some(PartialVec3 { x: Some(2.0), y: Some(2.0), z: None }),
        ..TransformUpdate::default()
    };
    let change =
        scene.reconciler.set_node_transform(&node("title"), update).await.expect("transform");

    assert_eq!(change.dimension, Dimension::TwoD);
    assert_eq!(change.warnings.len(), 1);
    assert!(change.warnings[0].contains("z=5"));
    assert!(change.change_verified);

    let title = scene.host.node("title").expect("title");
    assert_eq!(title.position, Vec3 { x: 1.0, y: 2.0, z: 0.0 });
    assert_eq!(title.scale, Vec3 { x: 2.0, y: 2.0, z: 1.0 });
}

#[rstest]
#[tokio::test]
async fn transform_on_3d_node_keeps_every_axis(scene: Scene) {
    let update = TransformUpdate {
        rotation: Some(PartialVec3 { x: Some(15.0), y: None, z: Some(90.0) }),
        ..TransformUpdate::default()
    };
    let change =
        scene.reconciler.set_node_transform(&node("cube"), update).await.expect("transform");
    assert_eq!(change.dimension, Dimension::ThreeD);
    assert!(change.warnings.is_empty());
    assert_eq!(
        scene.host.node("cube").map(|cube| cube.rotation),
        Some(Vec3 { x: 15.0, y: 0.0, z: 90.0 })
    );
}

#[rstest]
#[tokio::test]
async fn empty_transform_is_rejected(scene: Scene) {
    let err = scene
        .reconciler
        .set_node_transform(&node("title"), TransformUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(scene.host.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn node_name_and_active_are_written(scene: Scene) {
    let change = scene
        .reconciler
        .set_node_property(&node("title"), "name", &json!("Headline"))
        .await
        .expect("rename");
    assert!(change.change_verified);
    assert_eq!(change.before_value, json!("Title"));

    let change = scene
        .reconciler
        .set_node_property(&node("title"), "active", &json!("false"))
        .await
        .expect("deactivate");
    assert!(change.change_verified);
    assert_eq!(scene.host.node("title").map(|n| n.active), Some(false));

    let err = scene
        .reconciler
        .set_node_property(&node("title"), "layer", &json!(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = scene
        .reconciler
        .set_node_property(&node("title"), "scale", &json!({ "x": 1 }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Redirect);
}

#[test]
fn suggestion_needs_a_close_match() {
    let candidates = ["cc.UITransform", "cc.Label"];
    assert_eq!(suggest("cc.label", candidates).as_deref(), Some("cc.Label"));
    assert_eq!(suggest("cc.ParticleSystem", candidates), None);
    assert_eq!(suggest("  ", candidates), None);
}
