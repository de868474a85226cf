use std::{path::Path, sync::Arc};

use tokio_util::sync::CancellationToken;

use ltp_core::{
    config::{load_dotenv_if_present, KeyValueStore, OffloadConfig},
    hot_reload::ConfigHandle,
    offload::PasteOffloader,
};
use ltp_pastebin::PastebinClient;

mod relay;

#[tokio::main]
async fn main() -> Result<(), ltp_core::Error> {
    load_dotenv_if_present(Path::new(".env"));
    ltp_core::logging::init("ltp")?;

    let store = KeyValueStore::load(KeyValueStore::default_path())?;
    let cfg = OffloadConfig::from_store(&store);
    cfg.log_summary();

    let client = Arc::new(PastebinClient::new()?);
    let hook = Arc::new(PasteOffloader::new(ConfigHandle::new(cfg), client));

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
            }
            shutdown.cancel();
        });
    }

    #[cfg(unix)]
    tokio::spawn(relay::reload_on_sighup(
        hook.clone(),
        store,
        shutdown.clone(),
    ));

    let result = relay::run(hook, shutdown.clone()).await;
    shutdown.cancel();
    result
}
