// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use thiserror::Error;

use crate::host::TransportError;

/// Coarse failure category, surfaced to callers alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TypeMismatch,
    ReferenceResolution,
    Transport,
    Verification,
    Redirect,
    Conflict,
    InvalidArgument,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::TypeMismatch => "type_mismatch",
            Self::ReferenceResolution => "reference_resolution",
            Self::Transport => "transport",
            Self::Verification => "verification",
            Self::Redirect => "redirect",
            Self::Conflict => "conflict",
            Self::InvalidArgument => "invalid_argument",
        }
    }
}

/// Everything that aborts a reconcile operation.
///
/// A post-write read that disagrees with the written value is not in here: it is reported as
/// data on the outcome, because the write itself succeeded.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    #[error("node {node_id} not found")]
    NodeNotFound { node_id: String },

    #[error(
        "component '{component_type}' not found on node {node_id}; available components: {}",
        list_or_none(.available)
    )]
    ComponentNotFound {
        node_id: String,
        component_type: String,
        available: Vec<String>,
        suggestion: Option<String>,
    },

    #[error(
        "property '{property}' not found on component '{component_type}'; available properties: {}",
        list_or_none(.available)
    )]
    PropertyNotFound {
        component_type: String,
        property: String,
        available: Vec<String>,
    },

    #[error("cannot convert value to '{declared}': {message}")]
    TypeMismatch { declared: String, message: String },

    #[error("unsupported property type '{declared}'")]
    UnsupportedType { declared: String },

    #[error("{message}")]
    ReferenceResolution { message: String, available: Vec<String> },

    #[error("host call failed: {0}")]
    Transport(#[from] TransportError),

    #[error("{message}")]
    Verification { message: String },

    #[error("'{property}' is a node property, not a component property")]
    Redirect { property: String, tool: &'static str },

    #[error("invalid {name}: {message}")]
    InvalidArgument { name: &'static str, message: String },

    #[error(
        "rendering component conflict: node {node_id} already has '{existing}', \
         cannot add '{requested}'"
    )]
    RenderConflict {
        node_id: String,
        requested: String,
        existing: String,
    },
}

impl ReconcileError {
    pub fn type_mismatch(declared: impl ToString, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            declared: declared.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NodeNotFound { .. }
            | Self::ComponentNotFound { .. }
            | Self::PropertyNotFound { .. } => ErrorKind::NotFound,
            Self::TypeMismatch { .. } | Self::UnsupportedType { .. } => ErrorKind::TypeMismatch,
            Self::ReferenceResolution { .. } => ErrorKind::ReferenceResolution,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Verification { .. } => ErrorKind::Verification,
            Self::Redirect { .. } => ErrorKind::Redirect,
            Self::RenderConflict { .. } => ErrorKind::Conflict,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }

    /// What the caller could choose from instead.
    pub fn available(&self) -> &[String] {
        match self {
            Self::ComponentNotFound { available, .. }
            | Self::PropertyNotFound { available, .. }
            | Self::ReferenceResolution { available, .. } => available,
            _ => &[],
        }
    }

    /// A remediation hint for the caller, when one exists.
    pub fn instruction(&self) -> Option<String> {
        match self {
            Self::ComponentNotFound { suggestion: Some(suggestion), .. } => Some(format!(
                "Use the exact component type reported by component.list; \
                 did you mean '{suggestion}'?"
            )),
            Self::ComponentNotFound { .. } => {
                Some("Use the exact component type reported by component.list.".to_owned())
            }
            Self::PropertyNotFound { .. } => {
                Some("Use component.info to inspect the component's properties.".to_owned())
            }
            Self::UnsupportedType { .. } => Some(format!(
                "Use one of: {}.",
                crate::model::SemanticType::ALL.map(|ty| ty.as_str()).join(", ")
            )),
            Self::ReferenceResolution { .. } => Some(
                "Pass the uuid of a node that carries a component of the expected type.".to_owned(),
            ),
            Self::Redirect { tool, .. } => Some(format!("Use {tool} instead.")),
            Self::RenderConflict { existing, .. } => Some(format!(
                "A node can host only one rendering component; remove '{existing}' first \
                 or add the component to a child node."
            )),
            _ => None,
        }
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_owned()
    } else {
        items.join(", ")
    }
}
