// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Identifiers for the two host id spaces, the semantic value kinds a property write can carry,
//! and per-call snapshots of nodes and their components.

pub mod ids;
pub mod scene;
pub mod value;

pub use ids::{Id, IdError, NodeId, SceneLocalId};
pub use scene::{extract_scene_local_id, unwrap_dump, ComponentSnapshot, NodeSnapshot};
pub use value::{
    number_value, AssetKind, Color, SemanticType, SemanticValue, Size, UnsupportedSemanticType,
    Vec2, Vec3,
};
