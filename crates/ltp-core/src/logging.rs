use tracing_subscriber::{fmt, EnvFilter};

use crate::{errors::Error, Result};

/// Initialize logging/tracing for the hook host.
///
/// Default: info everywhere.
/// Can be overridden with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::External(format!("logging init failed: {e}")))
}

fn default_directives(service_name: &str) -> String {
    format!("info,ltp=info,ltp_core=info,ltp_pastebin=info,{service_name}=info")
}

/// Mask a secret for log output, keeping only its last four characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{tail}", "*".repeat(count - 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_is_info() {
        let directives = default_directives("ltp");
        assert!(directives.starts_with("info,"));
        assert!(directives.ends_with("ltp=info"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn mask_secret_keeps_tail_only() {
        assert_eq!(mask_secret(""), "<unset>");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("0123456789"), "******6789");
    }
}
