// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Per-call snapshots of host scene state.
//!
//! Snapshots are decoded from the host's node dump and never cached: every operation fetches a
//! fresh one. Host dumps are loosely shaped (fields may be bare or wrapped as `{value: ...}`), so
//! decoding is lenient and only gives up when the dump is not an object at all.

use serde_json::{json, Value};

use super::ids::{NodeId, SceneLocalId};
use super::value::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    component_type: String,
    enabled: bool,
    scene_local_id: Option<SceneLocalId>,
    index: usize,
    raw: Value,
}

impl ComponentSnapshot {
    pub fn from_dump(index: usize, raw: &Value) -> Self {
        let component_type = ["__type__", "type", "cid"]
            .into_iter()
            .find_map(|key| raw.get(key).map(unwrap_dump).and_then(Value::as_str))
            .unwrap_or_default()
            .to_owned();
        let enabled = raw.get("enabled").map(unwrap_dump).and_then(Value::as_bool).unwrap_or(true);

        Self {
            component_type,
            enabled,
            scene_local_id: extract_scene_local_id(raw),
            index,
            raw: raw.clone(),
        }
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn scene_local_id(&self) -> Option<&SceneLocalId> {
        self.scene_local_id.as_ref()
    }

    /// Position within the node's component list; addresses `__comps__.<index>` on writes.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The record the property analyzer walks: identity fields at the top, the host's property
    /// bag under `properties`.
    pub fn record(&self) -> Value {
        json!({
            "type": self.component_type,
            "enabled": self.enabled,
            "sceneLocalId": self.scene_local_id.as_ref().map(SceneLocalId::as_str),
            "properties": self.raw,
        })
    }

    /// `type(sceneLocalId)` as used in diagnostics.
    pub fn label(&self) -> String {
        let id = self.scene_local_id.as_ref().map(SceneLocalId::as_str).unwrap_or("?");
        format!("{}({id})", self.component_type)
    }
}

/// Reads the session-local id out of a component dump.
///
/// Hosts put it at `value.uuid.value`; flatter encodings are accepted as fallbacks.
pub fn extract_scene_local_id(raw: &Value) -> Option<SceneLocalId> {
    let candidates = [
        raw.pointer("/value/uuid/value"),
        raw.pointer("/value/uuid"),
        raw.pointer("/uuid/value"),
        raw.get("uuid"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find_map(|id| SceneLocalId::new(id).ok())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    node_id: NodeId,
    name: String,
    active: bool,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ComponentSnapshot>,
}

impl NodeSnapshot {
    /// Returns `None` when the host answered with anything other than an object (it answers
    /// `null` for unknown nodes).
    pub fn from_dump(node_id: &NodeId, dump: &Value) -> Option<Self> {
        let fields = dump.as_object()?;

        let name = fields
            .get("name")
            .map(unwrap_dump)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let active = fields.get("active").map(unwrap_dump).and_then(Value::as_bool).unwrap_or(true);
        let position = fields.get("position").map(|v| vec3_from_dump(v, 0.0)).unwrap_or(Vec3::ZERO);
        let rotation = fields
            .get("rotation")
            .or_else(|| fields.get("eulerAngles"))
            .map(|v| vec3_from_dump(v, 0.0))
            .unwrap_or(Vec3::ZERO);
        let scale = fields.get("scale").map(|v| vec3_from_dump(v, 1.0)).unwrap_or(Vec3::ONE);
        let parent = fields.get("parent").and_then(node_ref_from_dump);
        let children = fields
            .get("children")
            .map(unwrap_dump)
            .and_then(Value::as_array)
            .map(|children| children.iter().filter_map(node_ref_from_dump).collect())
            .unwrap_or_default();
        let components = fields
            .get("__comps__")
            .map(unwrap_dump)
            .and_then(Value::as_array)
            .map(|comps| {
                comps
                    .iter()
                    .enumerate()
                    .map(|(index, raw)| ComponentSnapshot::from_dump(index, raw))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            node_id: node_id.clone(),
            name,
            active,
            position,
            rotation,
            scale,
            parent,
            children,
            components,
        })
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn components(&self) -> &[ComponentSnapshot] {
        &self.components
    }

    pub fn component_types(&self) -> Vec<String> {
        self.components.iter().map(|c| c.component_type().to_owned()).collect()
    }

    /// First component whose type matches exactly.
    pub fn find_component(&self, component_type: &str) -> Option<&ComponentSnapshot> {
        self.components.iter().find(|c| c.component_type() == component_type)
    }
}

/// Strips the host's `{value: ...}` wrapper when present.
pub fn unwrap_dump(value: &Value) -> &Value {
    match value {
        Value::Object(map) if map.contains_key("value") => &map["value"],
        other => other,
    }
}

fn vec3_from_dump(value: &Value, default: f64) -> Vec3 {
    let value = unwrap_dump(value);
    let axis = |key: &str| value.get(key).and_then(Value::as_f64).unwrap_or(default);
    Vec3 { x: axis("x"), y: axis("y"), z: axis("z") }
}

fn node_ref_from_dump(value: &Value) -> Option<NodeId> {
    let value = unwrap_dump(value);
    let raw = match value {
        Value::String(raw) => raw.as_str(),
        Value::Object(_) => value.get("uuid").map(unwrap_dump).and_then(Value::as_str)?,
        _ => return None,
    };
    NodeId::new(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_id() -> NodeId {
        NodeId::new("node-1").expect("node id")
    }

    #[test]
    fn decodes_wrapped_node_dump() {
        let dump = json!({
            "uuid": { "value": "node-1" },
            "name": { "value": "Title" },
            "active": { "value": false },
            "position": { "value": { "x": 1.0, "y": 2.0, "z": 0.0 }, "type": "cc.Vec3" },
            "scale": { "value": { "x": 2.0, "y": 2.0 } },
            "parent": { "value": { "uuid": "canvas" } },
            "children": { "value": [{ "value": { "uuid": "child-a" } }] },
            "__comps__": [
                { "type": "cc.UITransform", "value": { "uuid": { "value": "c-1" } } },
                {
                    "__type__": "cc.Label",
                    "enabled": { "value": false },
                    "value": { "uuid": { "value": "c-2" } }
                }
            ]
        });

        let node = NodeSnapshot::from_dump(&node_id(), &dump).expect("snapshot");
        assert_eq!(node.name(), "Title");
        assert!(!node.active());
        assert_eq!(node.position(), Vec3 { x: 1.0, y: 2.0, z: 0.0 });
        assert_eq!(node.scale(), Vec3 { x: 2.0, y: 2.0, z: 1.0 });
        assert_eq!(node.parent().map(NodeId::as_str), Some("canvas"));
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.component_types(), vec!["cc.UITransform", "cc.Label"]);

        let label = node.find_component("cc.Label").expect("label");
        assert_eq!(label.index(), 1);
        assert!(!label.enabled());
        assert_eq!(label.label(), "cc.Label(c-2)");
    }

    #[test]
    fn null_dump_is_not_a_node() {
        assert!(NodeSnapshot::from_dump(&node_id(), &Value::Null).is_none());
    }

    #[test]
    fn scene_local_id_falls_back_to_flat_uuid() {
        assert_eq!(
            extract_scene_local_id(&json!({ "uuid": "flat" })).map(SceneLocalId::into_string),
            Some("flat".to_owned())
        );
        assert!(extract_scene_local_id(&json!({ "value": { "uuid": { "value": "" } } })).is_none());
    }

    #[test]
    fn record_exposes_type_and_property_bag() {
        let raw = json!({ "type": "cc.Label", "value": { "uuid": { "value": "c-9" } } });
        let component = ComponentSnapshot::from_dump(0, &raw);
        let record = component.record();
        assert_eq!(record["type"], "cc.Label");
        assert_eq!(record["sceneLocalId"], "c-9");
        assert_eq!(record["properties"], raw);
    }
}
