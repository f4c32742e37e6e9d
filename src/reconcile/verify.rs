// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::host::HostClient;
use crate::model::NodeId;

use super::analyzer::analyze;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub verified: bool,
    /// `None` when the re-read itself failed.
    pub actual_value: Option<Value>,
    pub before_value: Option<Value>,
    pub expected_value: Value,
}

/// Re-reads `component_type.property` on `node_id` once and compares it to `expected`.
///
/// Never fails: a transport error, a vanished node or component, or a vanished property all
/// produce `verified: false` with no actual value.
pub async fn verify(
    client: &HostClient,
    node_id: &NodeId,
    component_type: &str,
    property: &str,
    before: Option<Value>,
    expected: Value,
) -> VerificationOutcome {
    let actual = match client.query_node(node_id).await {
        Ok(Some(node)) => node
            .find_component(component_type)
            .map(|component| analyze(&component.record(), property))
            .filter(|analysis| analysis.exists)
            .and_then(|analysis| analysis.original_value),
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(node = %node_id, error = %err, "verification re-read failed");
            None
        }
    };

    let verified = actual.as_ref().is_some_and(|actual| values_match(actual, &expected));
    if !verified {
        tracing::warn!(
            node = %node_id,
            component_type,
            property,
            expected = %expected,
            actual = ?actual,
            "property write not observed"
        );
    }
    VerificationOutcome {
        verified,
        actual_value: actual,
        before_value: before,
        expected_value: expected,
    }
}

/// Type-aware comparison of a re-read value against the value that was written.
///
/// References compare by non-empty `uuid`. Values of the same JSON kind compare structurally with
/// numbers as `f64`. Differing kinds fall back to a loose match between scalars only: equal string
/// forms, or a number against a numeric string. `null` and booleans never loosely match numbers.
pub fn values_match(actual: &Value, expected: &Value) -> bool {
    if let Some(expected_uuid) = expected.as_object().and_then(|fields| fields.get("uuid")) {
        let actual_uuid = actual.get("uuid");
        return match (actual_uuid, expected_uuid) {
            (Some(Value::String(actual)), Value::String(expected)) => {
                !actual.is_empty() && actual == expected
            }
            _ => false,
        };
    }

    if same_kind(actual, expected) {
        return structurally_equal(actual, expected);
    }
    loosely_equal(actual, expected)
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| structurally_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, a)| b.get(key).is_some_and(|b| structurally_equal(a, b)))
        }
        _ => a == b,
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    let (Some(a_text), Some(b_text)) = (scalar_text(a), scalar_text(b)) else {
        return false;
    };
    if a_text == b_text {
        return true;
    }
    match (a, b) {
        (Value::Number(number), Value::String(text))
        | (Value::String(text), Value::Number(number)) => {
            let trimmed = text.trim();
            !trimmed.is_empty()
                && trimmed.parse::<f64>().ok().zip(number.as_f64()).is_some_and(|(a, b)| a == b)
        }
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
