//! The delivery hook: decide, upload, rewrite.

use std::sync::Arc;

use crate::{
    config::OffloadConfig,
    domain::{ModResult, OutboundMessage, Origin, TargetKind},
    errors::{Error, OffloadError},
    hot_reload::ConfigHandle,
    paste::PasteRequest,
    ports::{ConfigStore, PasteService},
};

/// Marker placed between the snippet and the paste reference.
pub const MORE_MARKER: &str = "... (more ";
pub const MORE_SUFFIX: &str = " )";

/// Moves over-long channel messages to a paste service.
///
/// Holds the live config and the process-scoped paste client. Each message
/// works on one config snapshot from start to finish.
pub struct PasteOffloader {
    config: ConfigHandle,
    service: Arc<dyn PasteService>,
}

impl PasteOffloader {
    pub fn new(config: ConfigHandle, service: Arc<dyn PasteService>) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    /// Host hook for every outbound message.
    ///
    /// Rewrites `msg.body` when the upload succeeds, leaves it alone
    /// otherwise. The message is always passed on.
    pub async fn on_user_pre_message(&self, msg: &mut OutboundMessage) -> ModResult {
        let cfg = self.config.snapshot();
        if !should_offload(msg, &cfg) {
            return ModResult::PassThrough;
        }

        tracing::debug!(
            originator = %msg.originator,
            len = msg.body_len(),
            cutofflen = cfg.cutoff_length,
            "message over cutoff, uploading"
        );

        match self.offload(msg, &cfg).await {
            Ok(reference) => {
                msg.body = rewrite(&msg.body, &reference, &cfg);
                tracing::debug!(originator = %msg.originator, %reference, "message rewritten");
            }
            Err(e) => {
                tracing::warn!(originator = %msg.originator, "paste upload failed: {e}");
            }
        }

        ModResult::PassThrough
    }

    /// Host hook for a configuration reload.
    pub fn on_rehash(&self, store: &dyn ConfigStore) {
        self.config.reload(store);
    }

    /// Upload the full body and return the reference to embed.
    ///
    /// Callers are expected to have checked [`should_offload`] first.
    pub async fn offload(
        &self,
        msg: &OutboundMessage,
        cfg: &OffloadConfig,
    ) -> Result<String, OffloadError> {
        cfg.validate().map_err(|e| match e {
            Error::Config(reason) => OffloadError::Config { reason },
            other => OffloadError::Config {
                reason: other.to_string(),
            },
        })?;

        let req = PasteRequest::for_message(msg, &cfg.api_key);
        tracing::debug!(
            endpoint = %cfg.service_endpoint,
            bytes = req.paste_body.len(),
            "paste upload starting"
        );

        let resp = self.service.upload(&req, cfg).await?;
        tracing::debug!(response = resp.text(), "paste upload finished");
        Ok(resp.into_text())
    }
}

/// Channel target, local sender, and strictly longer than the cutoff.
pub fn should_offload(msg: &OutboundMessage, cfg: &OffloadConfig) -> bool {
    msg.target == TargetKind::Channel
        && msg.origin == Origin::Local
        && msg.body_len() > cfg.cutoff_length
}

/// First `snippet_length` chars of `body`, then the marker and reference.
///
/// The marker is added even when the body is shorter than the snippet.
pub fn rewrite(body: &str, reference: &str, cfg: &OffloadConfig) -> String {
    let cut = body
        .char_indices()
        .nth(cfg.snippet_length)
        .map(|(idx, _)| idx)
        .unwrap_or(body.len());

    let mut out =
        String::with_capacity(cut + MORE_MARKER.len() + reference.len() + MORE_SUFFIX.len());
    out.push_str(&body[..cut]);
    out.push_str(MORE_MARKER);
    out.push_str(reference);
    out.push_str(MORE_SUFFIX);
    out
}
