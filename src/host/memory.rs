// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-process scene host.
//!
//! Answers the same `scene` commands a live editor bridge does, with the same loosely-wrapped
//! dump shapes. Used by `--demo`, the test suite, and the benches. It records every call so
//! callers can assert which commands were (or were not) issued, and it can be told to drop writes
//! or reject commands to exercise verification and transport failure paths.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::model::{number_value, Vec3};

use super::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub channel: String,
    pub command: String,
    pub args: Vec<Value>,
}

impl RecordedCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self.command.as_str(),
            "set-property" | "create-component" | "remove-component"
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostComponent {
    pub component_type: String,
    /// Allocated by the host on insert when `None`.
    pub scene_local_id: Option<String>,
    pub enabled: bool,
    /// When `false` the dump omits the scene-local id, as a host mid-reload sometimes does.
    pub reports_id: bool,
    /// Property name to descriptor (`{value, type, displayName, ...}`).
    pub properties: Map<String, Value>,
}

impl HostComponent {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            scene_local_id: None,
            enabled: true,
            reports_id: true,
            properties: Map::new(),
        }
    }

    /// A component carrying the property descriptors the host would create for `component_type`.
    pub fn with_defaults(component_type: impl Into<String>) -> Self {
        let mut component = Self::new(component_type);
        for (name, descriptor) in default_descriptors(&component.component_type) {
            component.properties.insert(name.to_owned(), descriptor);
        }
        component
    }

    pub fn with_id(mut self, scene_local_id: impl Into<String>) -> Self {
        self.scene_local_id = Some(scene_local_id.into());
        self
    }

    pub fn without_reported_id(mut self) -> Self {
        self.reports_id = false;
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, descriptor: Value) -> Self {
        self.properties.insert(name.into(), descriptor);
        self
    }

    fn dump(&self) -> Value {
        let mut bag = Map::new();
        if self.reports_id {
            bag.insert(
                "uuid".to_owned(),
                json!({ "value": self.scene_local_id.clone().unwrap_or_default() }),
            );
        }
        for (name, descriptor) in &self.properties {
            bag.insert(name.clone(), descriptor.clone());
        }
        json!({
            "type": self.component_type,
            "cid": self.component_type,
            "enabled": { "value": self.enabled },
            "value": Value::Object(bag),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HostNode {
    pub name: String,
    pub active: bool,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub parent: Option<String>,
    pub components: Vec<HostComponent>,
}

impl HostNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: true,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            parent: None,
            components: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_component(mut self, component: HostComponent) -> Self {
        self.components.push(component);
        self
    }
}

#[derive(Debug, Default)]
struct MemoryScene {
    nodes: BTreeMap<String, HostNode>,
    next_local_id: u64,
    calls: Vec<RecordedCall>,
    ignore_writes: bool,
    failing_commands: BTreeMap<String, String>,
}

impl MemoryScene {
    fn allocate_ids(&mut self, component: &mut HostComponent) {
        if component.scene_local_id.is_none() {
            self.next_local_id += 1;
            component.scene_local_id = Some(format!("c{:04}", self.next_local_id));
        }
    }

    fn node_dump(&self, uuid: &str) -> Value {
        let Some(node) = self.nodes.get(uuid) else {
            return Value::Null;
        };
        let children = self
            .nodes
            .iter()
            .filter(|(_, child)| child.parent.as_deref() == Some(uuid))
            .map(|(child_uuid, _)| json!({ "value": { "uuid": child_uuid } }))
            .collect::<Vec<_>>();
        json!({
            "uuid": { "value": uuid },
            "name": { "value": node.name },
            "active": { "value": node.active },
            "position": { "value": vec3_value(node.position), "type": "cc.Vec3" },
            "rotation": { "value": vec3_value(node.rotation), "type": "cc.Vec3" },
            "scale": { "value": vec3_value(node.scale), "type": "cc.Vec3" },
            "parent": { "value": node.parent.as_ref().map(|parent| json!({ "uuid": parent })) },
            "children": { "value": children },
            "__comps__": node.components.iter().map(HostComponent::dump).collect::<Vec<_>>(),
        })
    }

    fn set_property(&mut self, request: &Value) -> Result<Value, TransportError> {
        let uuid = str_field(request, "uuid")?;
        let path = str_field(request, "path")?;
        let dump = request.get("dump").cloned().unwrap_or(Value::Null);
        let value = dump.get("value").cloned().unwrap_or(Value::Null);
        let ignore_writes = self.ignore_writes;

        let node = self
            .nodes
            .get_mut(uuid)
            .ok_or_else(|| TransportError::remote(format!("node {uuid} not found")))?;

        if let Some(rest) = path.strip_prefix("__comps__.") {
            let (index, property) = rest
                .split_once('.')
                .ok_or_else(|| TransportError::remote(format!("invalid property path {path}")))?;
            let index: usize = index
                .parse()
                .map_err(|_| TransportError::remote(format!("invalid property path {path}")))?;
            let component = node
                .components
                .get_mut(index)
                .ok_or_else(|| TransportError::remote(format!("no component at {path}")))?;
            if ignore_writes {
                return Ok(Value::Bool(true));
            }
            if property == "enabled" {
                component.enabled = value.as_bool().unwrap_or(component.enabled);
                return Ok(Value::Bool(true));
            }
            match component.properties.get_mut(property) {
                Some(Value::Object(descriptor)) => {
                    descriptor.insert("value".to_owned(), value);
                }
                _ => {
                    let wire_type = dump.get("type").cloned().unwrap_or(Value::Null);
                    component.properties.insert(
                        property.to_owned(),
                        json!({ "value": value, "type": wire_type, "displayName": property }),
                    );
                }
            }
            return Ok(Value::Bool(true));
        }

        if ignore_writes {
            return Ok(Value::Bool(true));
        }
        match path {
            "position" => node.position = vec3_from(&value, node.position),
            "rotation" | "eulerAngles" => node.rotation = vec3_from(&value, node.rotation),
            "scale" => node.scale = vec3_from(&value, node.scale),
            "name" => {
                node.name = value
                    .as_str()
                    .ok_or_else(|| TransportError::remote("name must be a string"))?
                    .to_owned();
            }
            "active" => {
                node.active = value
                    .as_bool()
                    .ok_or_else(|| TransportError::remote("active must be a boolean"))?;
            }
            other => return Err(TransportError::remote(format!("unknown node property {other}"))),
        }
        Ok(Value::Bool(true))
    }

    fn create_component(&mut self, request: &Value) -> Result<Value, TransportError> {
        let uuid = str_field(request, "uuid")?;
        let component_type = str_field(request, "component")?;
        if !self.nodes.contains_key(uuid) {
            return Err(TransportError::remote(format!("node {uuid} not found")));
        }
        if self.ignore_writes {
            return Ok(Value::Bool(true));
        }
        let mut component = HostComponent::with_defaults(component_type);
        self.allocate_ids(&mut component);
        if let Some(node) = self.nodes.get_mut(uuid) {
            node.components.push(component);
        }
        Ok(Value::Bool(true))
    }

    fn remove_component(&mut self, request: &Value) -> Result<Value, TransportError> {
        let component_id = str_field(request, "uuid")?;
        let ignore_writes = self.ignore_writes;
        for node in self.nodes.values_mut() {
            let position = node
                .components
                .iter()
                .position(|c| c.scene_local_id.as_deref() == Some(component_id));
            if let Some(position) = position {
                if !ignore_writes {
                    node.components.remove(position);
                }
                return Ok(Value::Bool(true));
            }
        }
        Err(TransportError::remote(format!("component {component_id} not found")))
    }
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    scene: Mutex<MemoryScene>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn scene(&self) -> MutexGuard<'_, MemoryScene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_node(&self, uuid: impl Into<String>, mut node: HostNode) {
        let mut scene = self.scene();
        for component in &mut node.components {
            scene.allocate_ids(component);
        }
        scene.nodes.insert(uuid.into(), node);
    }

    pub fn node(&self, uuid: &str) -> Option<HostNode> {
        self.scene().nodes.get(uuid).cloned()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.scene().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.scene().calls.iter().filter(|call| call.is_mutation()).count()
    }

    /// Accept mutating commands but leave the scene untouched.
    pub fn set_ignore_writes(&self, ignore: bool) {
        self.scene().ignore_writes = ignore;
    }

    /// Reject every future `command` with `message`.
    pub fn fail_command(&self, command: impl Into<String>, message: impl Into<String>) {
        self.scene().failing_commands.insert(command.into(), message.into());
    }

    /// A small UI scene plus one 3D node.
    pub fn demo() -> Self {
        let host = Self::new();
        host.insert_node(
            "canvas",
            HostNode::new("Canvas")
                .with_component(HostComponent::with_defaults("cc.UITransform"))
                .with_component(HostComponent::new("cc.Canvas")),
        );
        host.insert_node(
            "title",
            HostNode::new("Title")
                .with_parent("canvas")
                .with_position(Vec3 { x: 0.0, y: 240.0, z: 0.0 })
                .with_component(HostComponent::with_defaults("cc.UITransform"))
                .with_component(HostComponent::with_defaults("cc.Label").with_property(
                    "string",
                    descriptor(json!("Hello Scenelink"), "String", "String"),
                )),
        );
        host.insert_node(
            "start-button",
            HostNode::new("StartButton")
                .with_parent("canvas")
                .with_component(HostComponent::with_defaults("cc.UITransform"))
                .with_component(HostComponent::with_defaults("cc.Sprite"))
                .with_component(HostComponent::with_defaults("cc.Button")),
        );
        host.insert_node(
            "scroll-bar",
            HostNode::new("ScrollBar")
                .with_parent("canvas")
                .with_component(HostComponent::with_defaults("cc.UITransform"))
                .with_component(HostComponent::with_defaults("cc.Sprite"))
                .with_component(HostComponent::with_defaults("cc.ScrollBar")),
        );
        host.insert_node(
            "scroll-view",
            HostNode::new("ScrollView")
                .with_parent("canvas")
                .with_component(HostComponent::with_defaults("cc.UITransform"))
                .with_component(HostComponent::with_defaults("cc.ScrollView")),
        );
        host.insert_node(
            "cube",
            HostNode::new("Cube")
                .with_position(Vec3 { x: 0.0, y: 1.0, z: -5.0 })
                .with_component(HostComponent::with_defaults("cc.MeshRenderer")),
        );
        host
    }
}

#[async_trait]
impl Transport for MemoryHost {
    async fn invoke(
        &self,
        channel: &str,
        command: &str,
        args: Vec<Value>,
    ) -> Result<Value, TransportError> {
        let mut scene = self.scene();
        scene.calls.push(RecordedCall {
            channel: channel.to_owned(),
            command: command.to_owned(),
            args: args.clone(),
        });
        if let Some(message) = scene.failing_commands.get(command) {
            return Err(TransportError::remote(message.clone()));
        }
        if channel != super::SCENE_CHANNEL {
            return Err(TransportError::remote(format!("unknown channel {channel}")));
        }

        let first = args.first().cloned().unwrap_or(Value::Null);
        match command {
            "query-node" => {
                let uuid = first
                    .as_str()
                    .or_else(|| first.get("uuid").and_then(Value::as_str))
                    .ok_or_else(|| TransportError::remote("query-node expects a node uuid"))?;
                Ok(scene.node_dump(uuid))
            }
            "set-property" => scene.set_property(&first),
            "create-component" => scene.create_component(&first),
            "remove-component" => scene.remove_component(&first),
            other => Err(TransportError::remote(format!("unknown command {other}"))),
        }
    }
}

fn str_field<'a>(request: &'a Value, key: &str) -> Result<&'a str, TransportError> {
    request
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| TransportError::remote(format!("missing '{key}'")))
}

fn vec3_value(v: Vec3) -> Value {
    json!({ "x": number_value(v.x), "y": number_value(v.y), "z": number_value(v.z) })
}

fn vec3_from(value: &Value, current: Vec3) -> Vec3 {
    let axis =
        |key: &str, fallback: f64| value.get(key).and_then(Value::as_f64).unwrap_or(fallback);
    Vec3 {
        x: axis("x", current.x),
        y: axis("y", current.y),
        z: axis("z", current.z),
    }
}

fn descriptor(value: Value, wire_type: &str, display_name: &str) -> Value {
    json!({ "value": value, "type": wire_type, "displayName": display_name, "readonly": false })
}

fn default_descriptors(component_type: &str) -> Vec<(&'static str, Value)> {
    let white = json!({ "r": 255, "g": 255, "b": 255, "a": 255 });
    match component_type {
        "cc.UITransform" => vec![
            (
                "contentSize",
                descriptor(json!({ "width": 100, "height": 100 }), "cc.Size", "Content Size"),
            ),
            ("anchorPoint", descriptor(json!({ "x": 0.5, "y": 0.5 }), "cc.Vec2", "Anchor Point")),
        ],
        "cc.Label" => vec![
            ("string", descriptor(json!("label"), "String", "String")),
            ("fontSize", descriptor(json!(40), "Number", "Font Size")),
            ("color", descriptor(white, "cc.Color", "Color")),
            ("font", descriptor(Value::Null, "cc.Font", "Font")),
        ],
        "cc.Sprite" => vec![
            ("spriteFrame", descriptor(Value::Null, "cc.SpriteFrame", "Sprite Frame")),
            ("color", descriptor(white, "cc.Color", "Color")),
            ("sizeMode", descriptor(json!(1), "Enum", "Size Mode")),
        ],
        "cc.Button" => vec![
            ("interactable", descriptor(json!(true), "Boolean", "Interactable")),
            ("target", descriptor(Value::Null, "cc.Node", "Target")),
            ("zoomScale", descriptor(json!(1.2), "Number", "Zoom Scale")),
        ],
        "cc.ScrollBar" => vec![
            ("direction", descriptor(json!(1), "Enum", "Direction")),
            ("enableAutoHide", descriptor(json!(false), "Boolean", "Enable Auto Hide")),
        ],
        "cc.ScrollView" => vec![
            ("content", descriptor(Value::Null, "cc.Node", "Content")),
            ("vertical", descriptor(json!(true), "Boolean", "Vertical")),
            (
                "verticalScrollBar",
                json!({
                    "value": null,
                    "displayName": "Vertical Scroll Bar",
                    "extends": ["cc.Object", "cc.Component", "cc.ScrollBar"],
                }),
            ),
        ],
        "cc.MeshRenderer" => vec![
            ("materials", descriptor(json!([]), "cc.Material", "Materials")),
            ("shadowCastingMode", descriptor(json!(0), "Enum", "Shadow Casting Mode")),
        ],
        _ => Vec::new(),
    }
}
