use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, logging::mask_secret, ports::ConfigStore, Result};

pub const DEFAULT_SERVICE_URL: &str = "https://pastebin.com/api/api_post.php";
pub const DEFAULT_SNIPPET_LEN: usize = 60;
pub const DEFAULT_CUTOFF_LEN: usize = 300;
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONFIG_FILE: &str = "largetextpaste.conf";

/// One immutable configuration snapshot for the offload hook.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OffloadConfig {
    pub service_endpoint: String,
    pub api_key: String,
    /// Leading chars kept in the rewritten message.
    pub snippet_length: usize,
    /// Messages strictly longer than this (in chars) are offloaded.
    pub cutoff_length: usize,
    pub upload_timeout: Duration,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            service_endpoint: DEFAULT_SERVICE_URL.to_string(),
            api_key: String::new(),
            snippet_length: DEFAULT_SNIPPET_LEN,
            cutoff_length: DEFAULT_CUTOFF_LEN,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl OffloadConfig {
    /// Read `sniplen`, `cutofflen`, `apikey`, `serviceurl` and `timeout_ms`
    /// from the host store, falling back to defaults for missing or unusable
    /// values.
    pub fn from_store(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();

        let service_endpoint = store
            .get_str("serviceurl")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.service_endpoint);
        let api_key = store
            .get_str("apikey")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        let snippet_length = read_len(store, "sniplen", defaults.snippet_length);
        let cutoff_length = read_len(store, "cutofflen", defaults.cutoff_length);
        let upload_timeout = store
            .get_int("timeout_ms")
            .filter(|ms| *ms > 0)
            .map(|ms| Duration::from_millis(ms as u64))
            .unwrap_or(defaults.upload_timeout);

        Self {
            service_endpoint,
            api_key,
            snippet_length,
            cutoff_length,
            upload_timeout,
        }
    }

    /// Problems that make every upload fail. Checked on load and before each
    /// upload, so a bad key never reaches the network.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Config("apikey is not set".to_string()));
        }
        if !(self.service_endpoint.starts_with("http://")
            || self.service_endpoint.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "serviceurl must be an http(s) URL: {}",
                self.service_endpoint
            )));
        }
        Ok(())
    }

    /// Log the loaded values and anything suspicious about them.
    pub fn log_summary(&self) {
        tracing::info!(
            sniplen = self.snippet_length,
            cutofflen = self.cutoff_length,
            apikey = %mask_secret(&self.api_key),
            serviceurl = %self.service_endpoint,
            timeout_ms = self.upload_timeout.as_millis() as u64,
            "largetextpaste config read"
        );
        if let Err(e) = self.validate() {
            tracing::warn!("largetextpaste uploads will fail: {e}");
        }
        if self.snippet_length > self.cutoff_length {
            tracing::warn!(
                sniplen = self.snippet_length,
                cutofflen = self.cutoff_length,
                "sniplen is larger than cutofflen"
            );
        }
    }
}

fn read_len(store: &dyn ConfigStore, key: &str, default: usize) -> usize {
    match store.get_int(key) {
        Some(v) if v >= 0 => v as usize,
        Some(v) => {
            tracing::warn!(key, value = v, default, "negative length in config, using default");
            default
        }
        None => default,
    }
}

/// `key=value` config file, the host store used by the `ltp` binary.
///
/// Blank lines and `#` comments are skipped; values may be quoted. A missing
/// file yields an empty store so every key takes its default.
#[derive(Clone, Debug, Default)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    values: HashMap<String, String>,
}

impl KeyValueStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => parse_key_values(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                HashMap::new()
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Location from `LTP_CONFIG`, or `largetextpaste.conf` in the working dir.
    pub fn default_path() -> PathBuf {
        env::var_os("LTP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: None,
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the backing file, if any.
    pub fn reload(&self) -> Result<Self> {
        match &self.path {
            Some(p) => Self::load(p.clone()),
            None => Ok(self.clone()),
        }
    }
}

impl ConfigStore for KeyValueStore {
    fn get_str(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

fn parse_key_values(contents: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        out.insert(key.to_string(), unquote(v.trim()).to_string());
    }
    out
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

/// Load `.env`-style variables into the process env without overriding
/// anything already set.
pub fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_key_values(&contents) {
        if env::var_os(&key).is_some() {
            continue;
        }
        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let cfg = OffloadConfig::from_store(&KeyValueStore::default());
        assert_eq!(cfg, OffloadConfig::default());
        assert_eq!(cfg.snippet_length, 60);
        assert_eq!(cfg.cutoff_length, 300);
        assert!(cfg.api_key.is_empty());
    }

    #[test]
    fn reads_declared_keys() {
        let store = KeyValueStore::from_pairs([
            ("sniplen", "20"),
            ("cutofflen", " 120 "),
            ("apikey", "devkey"),
            ("serviceurl", "http://paste.local/api"),
            ("timeout_ms", "2500"),
        ]);
        let cfg = OffloadConfig::from_store(&store);
        assert_eq!(cfg.snippet_length, 20);
        assert_eq!(cfg.cutoff_length, 120);
        assert_eq!(cfg.api_key, "devkey");
        assert_eq!(cfg.service_endpoint, "http://paste.local/api");
        assert_eq!(cfg.upload_timeout, Duration::from_millis(2500));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unusable_numbers_fall_back_to_defaults() {
        let store = KeyValueStore::from_pairs([
            ("sniplen", "-5"),
            ("cutofflen", "lots"),
            ("timeout_ms", "0"),
        ]);
        let cfg = OffloadConfig::from_store(&store);
        assert_eq!(cfg.snippet_length, DEFAULT_SNIPPET_LEN);
        assert_eq!(cfg.cutoff_length, DEFAULT_CUTOFF_LEN);
        assert_eq!(cfg.upload_timeout, DEFAULT_UPLOAD_TIMEOUT);
    }

    #[test]
    fn validate_flags_missing_key_and_bad_endpoint() {
        let cfg = OffloadConfig::default();
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let cfg = OffloadConfig {
            api_key: "k".to_string(),
            service_endpoint: "ftp://paste".to_string(),
            ..OffloadConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn parses_comments_and_quotes() {
        let values = parse_key_values(
            "# largetextpaste\n\napikey = \"abc def\"\nsniplen='40'\nbroken line\n=novalue\n",
        );
        assert_eq!(values.get("apikey").map(String::as_str), Some("abc def"));
        assert_eq!(values.get("sniplen").map(String::as_str), Some("40"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn missing_file_is_empty_store() {
        let path = PathBuf::from(format!("/tmp/ltp-missing-{}.conf", std::process::id()));
        let _ = fs::remove_file(&path);
        let store = KeyValueStore::load(&path).unwrap();
        assert_eq!(store.get_str("apikey"), None);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn reload_picks_up_file_changes() {
        let path = PathBuf::from(format!("/tmp/ltp-reload-{}.conf", std::process::id()));
        fs::write(&path, "cutofflen=100\n").unwrap();
        let store = KeyValueStore::load(&path).unwrap();
        assert_eq!(store.get_int("cutofflen"), Some(100));

        fs::write(&path, "cutofflen=200\n").unwrap();
        let store = store.reload().unwrap();
        assert_eq!(store.get_int("cutofflen"), Some(200));

        let _ = fs::remove_file(&path);
    }
}
