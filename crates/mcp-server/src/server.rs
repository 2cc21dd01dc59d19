//! Stdio server loop.
//!
//! One JSON-RPC message per line. Control messages are answered inline;
//! every `tools/call` runs in its own task so a slow export does not hold up
//! the rest. All responses funnel through one writer task.

use crate::error::ServerError;
use crate::protocol::*;
use crate::tools::tool_catalogue;
use dispatcher::Dispatcher;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const SERVER_NAME: &str = "swarmia-mcp";
const LOG_PREVIEW_CHARS: usize = 120;

#[derive(Clone)]
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serves stdin/stdout until stdin closes.
    pub async fn run(self) -> Result<(), ServerError> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.serve(stdin, tokio::io::stdout()).await?;
        Ok(())
    }

    /// Serves `reader` until EOF, writing responses to `writer`. Returns the
    /// writer once every in-flight call has been answered.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> Result<W, ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut in_flight = JoinSet::new();

        tracing::info!("MCP server started, waiting for messages.");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            reap_finished(&mut in_flight);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            tracing::debug!(raw = %preview(line), "Message received.");

            let request = match parse_request(line) {
                Ok(request) => request,
                Err(response) => {
                    send(&tx, &response);
                    continue;
                }
            };

            if request.method == "tools/call" && !request.is_notification() {
                let server = self.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    let response = server.call_tool(request).await;
                    send(&tx, &response);
                });
            } else if let Some(response) = self.handle_control(request) {
                send(&tx, &response);
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join_failure(joined);
        }
        drop(tx);

        let writer = writer_task.await??;
        tracing::info!("MCP server shutting down.");
        Ok(writer)
    }

    /// Handles one raw message. Returns `None` for notifications.
    pub async fn handle(&self, message: &str) -> Option<JsonRpcResponse> {
        let request = match parse_request(message) {
            Ok(request) => request,
            Err(response) => return Some(response),
        };
        if request.method == "tools/call" && !request.is_notification() {
            Some(self.call_tool(request).await)
        } else {
            self.handle_control(request)
        }
    }

    fn handle_control(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Notification received.");
            return None;
        }
        let id = request.id;

        let response = match request.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION,
                    capabilities: ServerCapabilities {
                        tools: ToolsCapability { list_changed: false },
                    },
                    server_info: ServerInfo {
                        name: SERVER_NAME,
                        version: env!("CARGO_PKG_VERSION"),
                    },
                };
                to_response(id, &result)
            }
            "ping" => JsonRpcResponse::success(id, Value::Object(Default::default())),
            "tools/list" => to_response(id, &ToolsListResult { tools: tool_catalogue() }),
            other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Unknown method: {}", other)),
        };
        Some(response)
    }

    async fn call_tool(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id;
        let params: ToolCallParams = match serde_json::from_value(request.params) {
            Ok(p) => p,
            Err(e) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid tools/call params: {}", e)),
        };

        tracing::debug!(tool = %params.name, "Calling tool.");
        let outcome = self.dispatcher.dispatch(&params.name, &params.arguments).await;
        to_response(id, &ToolCallResult::from(outcome))
    }
}

fn parse_request(message: &str) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(message)
        .map_err(|e| JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)))?;
    let id = value.get("id").cloned();
    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::error(id.clone(), INVALID_REQUEST, format!("Invalid request: {}", e)))?;
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
        ));
    }
    Ok(request)
}

fn to_response<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse::success(id, v),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}

fn send(tx: &mpsc::UnboundedSender<String>, response: &JsonRpcResponse) {
    match serde_json::to_string(response) {
        Ok(line) => {
            tracing::debug!(raw = %preview(&line), "Response queued.");
            if tx.send(line).is_err() {
                tracing::warn!("Response dropped, writer has stopped.");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to encode response."),
    }
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<String>, mut writer: W) -> Result<W, ServerError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(writer)
}

/// Drops tool-call tasks that have already finished so the set stays bounded.
fn reap_finished(in_flight: &mut JoinSet<()>) {
    while let Some(joined) = in_flight.try_join_next() {
        log_join_failure(joined);
    }
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "Tool call task aborted.");
    }
}

fn preview(message: &str) -> String {
    match message.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &message[..cut]),
        None => message.to_string(),
    }
}
