//! API credential storage
//!
//! Credentials are looked up per exchange under the service name
//! `terminalcrypto-<exchange>`. A missing entry is not an error for callers
//! that only need public data: `resolve_credentials` falls back to empty
//! credentials.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use termcrypto_core::Credentials;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::loader::write_private;

const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("no credentials stored for {0}")]
    NotFound(String),
    #[error("credential store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("credential store is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Secret store collaborator
pub trait CredentialStore {
    fn get(&self, exchange: &str) -> Result<Credentials, CredentialError>;
    fn set(&self, exchange: &str, credentials: &Credentials) -> Result<(), CredentialError>;
    fn delete(&self, exchange: &str) -> Result<(), CredentialError>;
}

/// Storage key for an exchange's credentials
pub fn service_name(exchange: &str) -> String {
    format!("terminalcrypto-{}", exchange.trim().to_lowercase())
}

/// Credentials for `exchange`, or empty (public access) when none are stored
pub fn resolve_credentials(store: &dyn CredentialStore, exchange: &str) -> Credentials {
    match store.get(exchange) {
        Ok(credentials) => credentials,
        Err(CredentialError::NotFound(_)) => {
            debug!("no stored credentials for {}, using public access", exchange);
            Credentials::public()
        }
        Err(e) => {
            warn!("could not read credentials for {}: {}; using public access", exchange, e);
            Credentials::public()
        }
    }
}

/// JSON file store, readable by the owner only
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    /// Store kept next to the config file
    pub fn in_dir(dir: &Path) -> Self {
        FileCredentialStore::new(dir.join(CREDENTIALS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, Credentials>, CredentialError> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, Credentials>) -> Result<(), CredentialError> {
        let json = serde_json::to_string_pretty(entries)?;
        write_private(&self.path, &json)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, exchange: &str) -> Result<Credentials, CredentialError> {
        self.read_all()?
            .remove(&service_name(exchange))
            .ok_or_else(|| CredentialError::NotFound(exchange.to_string()))
    }

    fn set(&self, exchange: &str, credentials: &Credentials) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        entries.insert(service_name(exchange), credentials.clone());
        self.write_all(&entries)
    }

    fn delete(&self, exchange: &str) -> Result<(), CredentialError> {
        let mut entries = self.read_all()?;
        if entries.remove(&service_name(exchange)).is_none() {
            return Err(CredentialError::NotFound(exchange.to_string()));
        }
        self.write_all(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name("Binance"), "terminalcrypto-binance");
    }

    #[test]
    fn test_set_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(dir.path());

        assert!(matches!(store.get("binance"), Err(CredentialError::NotFound(_))));

        let creds = Credentials::new("key", "secret");
        store.set("binance", &creds).unwrap();
        assert_eq!(store.get("BINANCE").unwrap(), creds);
        assert!(matches!(store.get("coinbase"), Err(CredentialError::NotFound(_))));

        store.delete("binance").unwrap();
        assert!(matches!(store.get("binance"), Err(CredentialError::NotFound(_))));
        assert!(matches!(store.delete("binance"), Err(CredentialError::NotFound(_))));
    }

    #[test]
    fn test_entries_are_independent() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(dir.path());

        store.set("binance", &Credentials::new("b-key", "b-secret")).unwrap();
        store.set("coinbase", &Credentials::new("c-key", "c-secret")).unwrap();
        store.set("binance", &Credentials::new("b-key-2", "b-secret-2")).unwrap();

        assert_eq!(store.get("binance").unwrap().api_key, "b-key-2");
        assert_eq!(store.get("coinbase").unwrap().api_key, "c-key");
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(dir.path());
        store.set("binance", &Credentials::new("k", "s")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_readable_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(dir.path());
        fs::write(store.path(), "{}").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.set("binance", &Credentials::new("k", "s")).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get("binance").unwrap().api_secret, "s");
    }

    #[test]
    fn test_resolve_falls_back_to_public() {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(dir.path());
        assert!(resolve_credentials(&store, "binance").is_empty());

        fs::write(store.path(), "not json").unwrap();
        assert!(resolve_credentials(&store, "binance").is_empty());

        fs::remove_file(store.path()).unwrap();
        store.set("binance", &Credentials::new("k", "s")).unwrap();
        assert_eq!(resolve_credentials(&store, "binance").api_key, "k");
    }
}
