// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scenelink: component-property reconciliation for a live scene editor, served over MCP.
//!
//! Callers describe a property write in loose terms (a component type, a property name, a declared
//! kind, a JSON value). [`reconcile`] turns that into the exact dump the editor expects, sends it
//! through [`host`], and re-reads the node to report whether the change landed.

pub mod host;
pub mod mcp;
pub mod model;
pub mod reconcile;
