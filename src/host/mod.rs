// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The boundary to the editor process that owns the live scene.
//!
//! Everything crosses a single primitive: send a named command with positional JSON arguments on
//! a channel and await a JSON result. Nothing is assumed about ordering or atomicity across two
//! calls.

pub mod client;
pub mod memory;
pub mod tcp;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use client::{HostClient, SCENE_CHANNEL};
pub use memory::{HostComponent, HostNode, MemoryHost, RecordedCall};
pub use tcp::TcpTransport;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The host received the call and rejected it.
    #[error("{message}")]
    Remote { message: String },
    #[error("cannot reach host: {0}")]
    Connection(String),
    #[error("malformed host reply: {0}")]
    Protocol(String),
}

impl TransportError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote { message: message.into() }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn invoke(
        &self,
        channel: &str,
        command: &str,
        args: Vec<Value>,
    ) -> Result<Value, TransportError>;
}
