//! Channel-based tool hub
//!
//! Every registered tool gets a bounded `mpsc` queue and a dedicated worker
//! task. A call stamps a correlation id on the request, hands the worker a
//! `oneshot` sender for the reply and waits (bounded by the per-call
//! timeout) for the matching envelope.
//!
//! ```text
//! Executor ──invoke──▶ ChannelToolHub ──mpsc──▶ worker(tool) ──▶ ToolHandler
//!     ▲                      │                        │
//!     └──── ToolResponse ◀── decode ◀──── oneshot ◀───┘
//! ```

use super::error::HubError;
use super::handler::ToolHandler;
use crate::config::FileHubConfig;
use async_trait::async_trait;
use conductor_application::{ToolInvocationError, ToolInvokerPort};
use conductor_domain::{ToolRequest, ToolResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Raw reply paired with the id of the request it answers
#[derive(Debug)]
struct Envelope {
    correlation_id: u64,
    body: Value,
}

/// A queued request
struct HubMessage {
    correlation_id: u64,
    request: ToolRequest,
    reply: oneshot::Sender<Envelope>,
}

/// Hub timing and queue settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HubSettings {
    pub call_timeout: Duration,
    pub channel_capacity: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self::from(&FileHubConfig::default())
    }
}

impl From<&FileHubConfig> for HubSettings {
    fn from(config: &FileHubConfig) -> Self {
        Self {
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            channel_capacity: config.channel_capacity.max(1),
        }
    }
}

/// Collects handlers before the hub's workers are spawned
pub struct ChannelToolHubBuilder {
    settings: HubSettings,
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ChannelToolHubBuilder {
    pub fn register(mut self, handler: Arc<dyn ToolHandler>) -> Result<Self, HubError> {
        let id = handler.tool_id();
        if self.handlers.iter().any(|h| h.tool_id() == id) {
            return Err(HubError::DuplicateTool(id.to_string()));
        }
        self.handlers.push(handler);
        Ok(self)
    }

    /// Spawn one worker per handler. Must be called inside a tokio runtime.
    pub fn start(self) -> ChannelToolHub {
        let mut channels = HashMap::with_capacity(self.handlers.len());
        let mut workers = Vec::with_capacity(self.handlers.len());

        for handler in self.handlers {
            let (tx, rx) = mpsc::channel(self.settings.channel_capacity);
            channels.insert(handler.tool_id().to_string(), tx);
            workers.push(tokio::spawn(worker_loop(handler, rx)));
        }

        debug!(tools = channels.len(), "Tool hub started");

        ChannelToolHub {
            channels,
            workers,
            next_correlation_id: AtomicU64::new(1),
            call_timeout: self.settings.call_timeout,
        }
    }
}

/// Production [`ToolInvokerPort`] adapter
pub struct ChannelToolHub {
    channels: HashMap<String, mpsc::Sender<HubMessage>>,
    workers: Vec<JoinHandle<()>>,
    next_correlation_id: AtomicU64,
    call_timeout: Duration,
}

impl ChannelToolHub {
    pub fn builder(settings: HubSettings) -> ChannelToolHubBuilder {
        ChannelToolHubBuilder {
            settings,
            handlers: Vec::new(),
        }
    }

    /// Send one request and wait for its decoded reply
    pub async fn call(&self, request: ToolRequest) -> Result<ToolResponse, HubError> {
        let tool = request.tool_id.clone();
        let sender = self
            .channels
            .get(&tool)
            .ok_or_else(|| HubError::UnknownTool(tool.clone()))?;

        let correlation_id = self.next_correlation_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = oneshot::channel();
        trace!(tool = %tool, correlation_id, "Dispatching request");

        let exchange = async {
            sender
                .send(HubMessage {
                    correlation_id,
                    request,
                    reply: reply_tx,
                })
                .await
                .map_err(|_| HubError::ChannelClosed(tool.clone()))?;
            reply_rx
                .await
                .map_err(|_| HubError::ChannelClosed(tool.clone()))
        };

        let envelope = tokio::time::timeout(self.call_timeout, exchange)
            .await
            .map_err(|_| HubError::Timeout {
                tool: tool.clone(),
                after_ms: self.call_timeout.as_millis() as u64,
            })??;

        if envelope.correlation_id != correlation_id {
            return Err(HubError::CorrelationMismatch {
                tool,
                expected: correlation_id,
                got: envelope.correlation_id,
            });
        }

        decode_reply(&tool, envelope.body)
    }

    pub fn tool_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.channels.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Close every queue and wait for the workers to drain
    pub async fn shutdown(self) {
        drop(self.channels);
        for worker in self.workers {
            if let Err(e) = worker.await {
                warn!("Tool worker ended abnormally: {}", e);
            }
        }
    }
}

#[async_trait]
impl ToolInvokerPort for ChannelToolHub {
    async fn invoke(&self, request: ToolRequest) -> Result<ToolResponse, ToolInvocationError> {
        self.call(request).await.map_err(ToolInvocationError::from)
    }

    fn available_tools(&self) -> Vec<String> {
        self.tool_ids()
    }

    fn has_tool(&self, tool_id: &str) -> bool {
        self.channels.contains_key(tool_id)
    }
}

async fn worker_loop(handler: Arc<dyn ToolHandler>, mut rx: mpsc::Receiver<HubMessage>) {
    let tool = handler.tool_id().to_string();
    while let Some(message) = rx.recv().await {
        let body = handler.handle(&message.request).await;
        let envelope = Envelope {
            correlation_id: message.correlation_id,
            body,
        };
        if message.reply.send(envelope).is_err() {
            debug!(tool = %tool, correlation_id = message.correlation_id, "Caller gone before reply");
        }
    }
    debug!(tool = %tool, "Tool worker stopped");
}

/// An `error` field is the tool's own failure; anything else that lacks
/// `data` is malformed.
fn decode_reply(tool: &str, body: Value) -> Result<ToolResponse, HubError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(HubError::ToolFailed {
            tool: tool.to_string(),
            message,
        });
    }
    ToolResponse::from_raw(body).map_err(|e| HubError::Malformed {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
