use async_trait::async_trait;

use crate::{
    config::OffloadConfig,
    errors::OffloadError,
    paste::{PasteRequest, PasteResponse},
};

/// Port for the remote paste service.
///
/// Implementations own the process-scoped HTTP resources; one call is one
/// upload attempt and must be bounded by `cfg.upload_timeout`.
#[async_trait]
pub trait PasteService: Send + Sync {
    async fn upload(
        &self,
        req: &PasteRequest,
        cfg: &OffloadConfig,
    ) -> Result<PasteResponse, OffloadError>;
}

/// Read-only view of the host's configuration store.
///
/// Keys are looked up inside the hook's own config block; the file format is
/// the host's business.
pub trait ConfigStore: Send + Sync {
    fn get_str(&self, key: &str) -> Option<String>;

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get_str(key).and_then(|s| s.trim().parse::<i64>().ok())
    }
}
