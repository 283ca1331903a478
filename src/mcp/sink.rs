//! `RunSink` over an MCP request: log lines become `notifications/message`,
//! progress becomes `notifications/progress` when the client asked for it.

use async_trait::async_trait;
use rmcp::model::{
    LoggingLevel, LoggingMessageNotificationParam, ProgressNotificationParam, ProgressToken,
};
use rmcp::service::RequestContext;
use rmcp::{Peer, RoleServer};

use crate::runner::RunSink;

/// Logger name attached to forwarded lines.
pub const LOGGER: &str = "cursor-tools";

pub struct McpSink {
    peer: Peer<RoleServer>,
    progress_token: Option<ProgressToken>,
}

impl McpSink {
    pub fn from_context(ctx: &RequestContext<RoleServer>) -> Self {
        Self {
            peer: ctx.peer.clone(),
            progress_token: ctx.meta.get_progress_token(),
        }
    }

    async fn log(&self, level: LoggingLevel, message: &str) {
        let param = LoggingMessageNotificationParam {
            level,
            logger: Some(LOGGER.to_string()),
            data: serde_json::Value::String(message.to_string()),
        };
        if let Err(e) = self.peer.notify_logging_message(param).await {
            tracing::debug!(error = %e, "dropping log notification");
        }
    }
}

#[async_trait]
impl RunSink for McpSink {
    async fn info(&self, message: &str) {
        self.log(LoggingLevel::Info, message).await;
    }

    async fn error(&self, message: &str) {
        self.log(LoggingLevel::Error, message).await;
    }

    async fn progress(&self, current: u32, total: u32) {
        let Some(token) = &self.progress_token else {
            return;
        };
        let param = ProgressNotificationParam {
            progress_token: token.clone(),
            progress: f64::from(current),
            total: Some(f64::from(total)),
            message: None,
        };
        if let Err(e) = self.peer.notify_progress(param).await {
            tracing::debug!(error = %e, "dropping progress notification");
        }
    }
}
