// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenelink-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenelink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scenelink CLI entrypoint.
//!
//! By default this serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp` and talks to
//! the editor bridge at `--host`.
//!
//! Use `--mcp` to run the MCP server over stdio instead (intended for tool integrations).

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use scenelink::host::{HostClient, MemoryHost, TcpTransport, Transport};
use scenelink::mcp::ScenelinkMcp;
use scenelink::reconcile::{ReconcileConfig, Reconciler, DEFAULT_SETTLE_DELAY};
use tracing_subscriber::EnvFilter;

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
const DEFAULT_HOST_ADDR: &str = "127.0.0.1:27437";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  \
         {program} [--host <addr>] [--settle-ms <ms>] [--mcp-http-port <port>]\n  \
         {program} [--host <addr>] [--settle-ms <ms>] --mcp\n  \
         {program} --demo [--mcp | --mcp-http-port <port>]\n\n\
         By default MCP is served over streamable HTTP at `http://127.0.0.1:<port>/mcp`.\n\
         --mcp-http-port selects the port (0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}).\n\n\
         --host is the editor bridge address (default {DEFAULT_HOST_ADDR}).\n\
         --demo uses a built-in in-memory scene and cannot be combined with --host.\n\
         --settle-ms is the wait before confirming re-reads (default {}).\n\n\
         Logs go to stderr; set RUST_LOG to adjust (default scenelink=info).",
        DEFAULT_SETTLE_DELAY.as_millis()
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    mcp: bool,
    demo: bool,
    host: Option<String>,
    mcp_http_port: Option<u16>,
    settle_ms: Option<u64>,
}

impl CliOptions {
    fn reconcile_config(&self) -> ReconcileConfig {
        match self.settle_ms {
            Some(ms) => ReconcileConfig { settle_delay: Duration::from_millis(ms) },
            None => ReconcileConfig::default(),
        }
    }
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mcp" => {
                if options.mcp {
                    return Err(());
                }
                options.mcp = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--host" => {
                if options.host.is_some() {
                    return Err(());
                }
                let addr = args.next().ok_or(())?;
                if addr.trim().is_empty() {
                    return Err(());
                }
                options.host = Some(addr);
            }
            "--mcp-http-port" => {
                if options.mcp_http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.mcp_http_port = Some(port);
            }
            "--settle-ms" => {
                if options.settle_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let ms: u64 = raw.parse().map_err(|_| ())?;
                options.settle_ms = Some(ms);
            }
            _ => return Err(()),
        }
    }

    if options.demo && options.host.is_some() {
        return Err(());
    }

    if options.mcp && options.mcp_http_port.is_some() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scenelink=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "scenelink".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        let transport: Arc<dyn Transport> = if options.demo {
            tracing::info!("using the built-in demo scene");
            Arc::new(MemoryHost::demo())
        } else {
            let addr = options.host.clone().unwrap_or_else(|| DEFAULT_HOST_ADDR.to_owned());
            tracing::info!(host = %addr, "using the editor bridge");
            Arc::new(TcpTransport::new(addr))
        };
        let config = options.reconcile_config();
        tracing::debug!(settle_ms = config.settle_delay.as_millis() as u64, "reconcile config");
        let mcp = ScenelinkMcp::new(Reconciler::new(HostClient::new(transport), config));

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        if options.mcp {
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let mcp_http_port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", mcp_http_port)).await?;
            tracing::info!(addr = %listener.local_addr()?, "serving MCP at /mcp");

            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..StreamableHttpServerConfig::default()
            };
            let shutdown_token = config.cancellation_token.clone();

            let session_manager = Arc::new(LocalSessionManager::default());
            let mcp_service =
                StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

            let router = Router::new().nest_service("/mcp", mcp_service);
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    if let Err(err) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %err, "failed to listen for ctrl-c");
                    }
                    tracing::info!("shutting down");
                    shutdown_token.cancel();
                })
                .await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("scenelink: {err}");
        std::process::exit(1);
    }
}
