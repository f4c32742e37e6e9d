// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Newline-delimited JSON bridge to an editor extension.
//!
//! One request per line (`{id, channel, command, args}`), one reply per line (`{id, result}` or
//! `{id, error: {message}}`). Calls are serialized over a single lazily-opened connection; an I/O
//! failure drops the connection so the next call reconnects.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use super::{Transport, TransportError};

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    channel: &'a str,
    command: &'a str,
    args: &'a [Value],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BridgeErrorBody {
    Message { message: String },
    Text(String),
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    id: Option<u64>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<BridgeErrorBody>,
}

#[derive(Debug)]
struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

/// How long one call may wait for its reply before the connection is dropped.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct TcpTransport {
    addr: String,
    call_timeout: Duration,
    connection: Mutex<Option<Connection>>,
    next_id: AtomicU64,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            connection: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    async fn connect(&self) -> Result<Connection, TransportError> {
        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|err| TransportError::Connection(format!("{}: {err}", self.addr)))?;
        let (reader, writer) = stream.into_split();
        tracing::debug!(addr = %self.addr, "connected to editor bridge");
        Ok(Connection { reader: BufReader::new(reader), writer })
    }

    async fn round_trip(
        connection: &mut Connection,
        id: u64,
        line: &str,
    ) -> Result<BridgeReply, TransportError> {
        let io_err = |err: std::io::Error| TransportError::Connection(err.to_string());

        connection.writer.write_all(line.as_bytes()).await.map_err(io_err)?;
        connection.writer.write_all(b"\n").await.map_err(io_err)?;
        connection.writer.flush().await.map_err(io_err)?;

        let mut buf = String::new();
        loop {
            buf.clear();
            let read = connection.reader.read_line(&mut buf).await.map_err(io_err)?;
            if read == 0 {
                return Err(TransportError::Connection("bridge closed the connection".to_owned()));
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            let reply: BridgeReply = serde_json::from_str(trimmed)
                .map_err(|err| TransportError::Protocol(err.to_string()))?;
            match reply.id {
                Some(reply_id) if reply_id != id => {
                    tracing::debug!(expected = id, got = reply_id, "skipping stale bridge reply");
                }
                _ => return Ok(reply),
            }
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn invoke(
        &self,
        channel: &str,
        command: &str,
        args: Vec<Value>,
    ) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let line = serde_json::to_string(&BridgeRequest { id, channel, command, args: &args })
            .map_err(|err| TransportError::Protocol(err.to_string()))?;

        let mut guard = self.connection.lock().await;
        if guard.is_none() {
            *guard = Some(self.connect().await?);
        }
        let Some(connection) = guard.as_mut() else {
            return Err(TransportError::Connection("no connection".to_owned()));
        };

        let round_trip = Self::round_trip(connection, id, &line);
        let result = tokio::time::timeout(self.call_timeout, round_trip).await.unwrap_or_else(|_| {
            tracing::warn!(addr = %self.addr, command, "bridge did not reply in time");
            Err(TransportError::Connection(format!(
                "no reply from {} within {}ms",
                self.addr,
                self.call_timeout.as_millis()
            )))
        });
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                if matches!(err, TransportError::Connection(_)) {
                    *guard = None;
                }
                return Err(err);
            }
        };

        match reply.error {
            Some(BridgeErrorBody::Message { message }) | Some(BridgeErrorBody::Text(message)) => {
                Err(TransportError::Remote { message })
            }
            None => Ok(reply.result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn spawn_bridge(replies: Vec<Value>) -> (String, tokio::task::JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr").to_string();
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            let mut requests = Vec::new();
            for mut reply in replies {
                let Some(line) = lines.next_line().await.expect("read line") else {
                    break;
                };
                let request: Value = serde_json::from_str(&line).expect("request json");
                reply["id"] = request["id"].clone();
                requests.push(request);
                writer.write_all(format!("{reply}\n").as_bytes()).await.expect("write reply");
            }
            requests
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn invoke_frames_request_and_returns_result() {
        let (addr, bridge) = spawn_bridge(vec![json!({ "result": { "name": "Title" } })]).await;
        let transport = TcpTransport::new(addr);

        let result = transport
            .invoke("scene", "query-node", vec![json!("title")])
            .await
            .expect("invoke");
        assert_eq!(result, json!({ "name": "Title" }));

        let requests = bridge.await.expect("bridge task");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["channel"], "scene");
        assert_eq!(requests[0]["command"], "query-node");
        assert_eq!(requests[0]["args"], json!(["title"]));
    }

    #[tokio::test]
    async fn remote_error_maps_to_remote_variant() {
        let (addr, _bridge) =
            spawn_bridge(vec![json!({ "error": { "message": "Node not found" } })]).await;
        let transport = TcpTransport::new(addr);

        let err = transport.invoke("scene", "query-node", vec![json!("x")]).await.unwrap_err();
        assert_eq!(err, TransportError::remote("Node not found"));
    }

    #[tokio::test]
    async fn silent_bridge_times_out_and_the_next_call_reconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr").to_string();
        let bridge = tokio::spawn(async move {
            let (silent, _) = listener.accept().await.expect("accept silent");
            let (stream, _) = listener.accept().await.expect("accept second");
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();
            let line = lines.next_line().await.expect("read line").expect("request line");
            let request: Value = serde_json::from_str(&line).expect("request json");
            let reply = json!({ "id": request["id"], "result": "pong" });
            writer.write_all(format!("{reply}\n").as_bytes()).await.expect("write reply");
            drop(silent);
        });

        let transport = TcpTransport::new(addr).with_call_timeout(Duration::from_millis(50));
        let err = transport.invoke("scene", "query-node", vec![json!("a")]).await.unwrap_err();
        assert!(
            matches!(&err, TransportError::Connection(message) if message.contains("no reply"))
        );

        let result =
            transport.invoke("scene", "query-node", vec![json!("b")]).await.expect("retry");
        assert_eq!(result, json!("pong"));
        bridge.await.expect("bridge task");
    }

    #[tokio::test]
    async fn unreachable_bridge_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr").to_string();
        drop(listener);

        let transport = TcpTransport::new(addr);
        let err = transport.invoke("scene", "query-node", vec![]).await.unwrap_err();
        assert!(matches!(err, TransportError::Connection(_)));
    }
}
