//! Stand-in host: feeds stdin lines through the delivery hook.
//!
//! Line format is `<nick> <target> <text...>`. Targets starting with `#` or
//! `&` are channels; everyone on stdin counts as a local user.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use ltp_core::{
    domain::{Origin, OutboundMessage, TargetKind},
    offload::PasteOffloader,
    Result,
};

/// A parsed input line: where it goes plus the message itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub target: String,
    pub message: OutboundMessage,
}

impl Delivery {
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {}",
            self.message.originator, self.target, self.message.body
        )
    }
}

pub fn parse_line(line: &str) -> Option<Delivery> {
    let mut parts = line.splitn(3, ' ');
    let nick = parts.next().filter(|s| !s.is_empty())?;
    let target = parts.next().filter(|s| !s.is_empty())?;
    let text = parts.next()?;

    let kind = if target.starts_with('#') || target.starts_with('&') {
        TargetKind::Channel
    } else {
        TargetKind::Direct
    };

    Some(Delivery {
        target: target.to_string(),
        message: OutboundMessage::new(nick, text, kind, Origin::Local),
    })
}

/// Relay stdin to stdout until EOF or shutdown.
pub async fn run(hook: Arc<PasteOffloader>, shutdown: CancellationToken) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            tracing::debug!("stdin closed");
            break;
        };

        let rendered = match parse_line(&line) {
            Some(mut delivery) => {
                hook.on_user_pre_message(&mut delivery.message).await;
                delivery.to_line()
            }
            None => {
                tracing::debug!("unparsed line passed through");
                line
            }
        };

        out.write_all(rendered.as_bytes()).await?;
        out.write_all(b"\n").await?;
        out.flush().await?;
    }

    Ok(())
}

/// Re-read the config file on every SIGHUP.
#[cfg(unix)]
pub async fn reload_on_sighup(
    hook: Arc<PasteOffloader>,
    mut store: ltp_core::config::KeyValueStore,
    shutdown: CancellationToken,
) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("cannot listen for SIGHUP, reload disabled: {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            got = hup.recv() => {
                if got.is_none() {
                    return;
                }
            }
        }

        match store.reload() {
            Ok(fresh) => {
                store = fresh;
                hook.on_rehash(&store);
            }
            Err(e) => tracing::warn!("config reload failed, keeping previous config: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_channel_and_direct_targets() {
        let d = parse_line("alice #rust hello there").unwrap();
        assert_eq!(d.target, "#rust");
        assert_eq!(d.message.originator, "alice");
        assert_eq!(d.message.body, "hello there");
        assert_eq!(d.message.target, TargetKind::Channel);
        assert_eq!(d.message.origin, Origin::Local);

        let d = parse_line("alice &local hi").unwrap();
        assert_eq!(d.message.target, TargetKind::Channel);

        let d = parse_line("alice bob hi").unwrap();
        assert_eq!(d.message.target, TargetKind::Direct);
    }

    #[test]
    fn rejects_incomplete_lines() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("alice"), None);
        assert_eq!(parse_line("alice #rust"), None);
        assert_eq!(parse_line(" #rust text"), None);
    }

    #[test]
    fn renders_back_to_line() {
        let line = "alice #rust some  spaced   text";
        assert_eq!(parse_line(line).unwrap().to_line(), line);
    }
}
