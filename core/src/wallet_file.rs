/// Wallet list persistence.
///
/// File format (JSON):
/// `{ "spend_password": <verifier or null>, "wallets": [Wallet, ...] }`
/// Balances are not stored; each wallet rebuilds its balance from its history.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::password::PasswordVerifier;
use crate::storage::write_private;
use crate::wallet::Wallet;

/// Supplies the initial wallet list to the store.
pub trait WalletSource {
    fn get_wallets(&self) -> Result<Vec<Wallet>>;
}

#[derive(Default, Serialize, Deserialize)]
struct WalletFileData {
    #[serde(default)]
    spend_password: Option<PasswordVerifier>,
    #[serde(default)]
    wallets: Vec<Wallet>,
}

/// Path: `data_dir()/wallets.json`
pub struct WalletFile {
    path: PathBuf,
}

impl WalletFile {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::data_dir()?.join("wallets.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the wallet list, keeping the stored spending password.
    pub fn save(&self, wallets: &[Wallet]) -> Result<()> {
        let mut data = self.read()?;
        data.wallets = wallets.to_vec();
        self.write(&data)
    }

    pub fn spend_password(&self) -> Result<Option<PasswordVerifier>> {
        Ok(self.read()?.spend_password)
    }

    pub fn set_spend_password(&self, verifier: PasswordVerifier) -> Result<()> {
        let mut data = self.read()?;
        data.spend_password = Some(verifier);
        self.write(&data)
    }

    fn read(&self) -> Result<WalletFileData> {
        if !self.path.exists() {
            return Ok(WalletFileData::default());
        }
        let data = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read wallet file {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse wallet file {}. File may be corrupt.", self.path.display()))
    }

    fn write(&self, data: &WalletFileData) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize wallet file")?;
        write_private(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write wallet file {}", self.path.display()))
    }
}

impl WalletSource for WalletFile {
    fn get_wallets(&self) -> Result<Vec<Wallet>> {
        Ok(self.read()?.wallets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Transaction;

    #[test]
    fn missing_file_has_no_wallets() {
        let dir = tempfile::tempdir().unwrap();
        let file = WalletFile::at(dir.path().join("wallets.json"));
        assert!(!file.exists());
        assert!(file.get_wallets().unwrap().is_empty());
        assert!(file.spend_password().unwrap().is_none());
    }

    #[test]
    fn save_and_reload_wallets() {
        let dir = tempfile::tempdir().unwrap();
        let file = WalletFile::at(dir.path().join("wallets.json"));
        let wallet = Wallet::new("main", "ccx7main")
            .with_transactions(vec![Transaction::received("h1", 10, 7_000_000, "ccx7src").unwrap()])
            .unwrap();
        file.save(std::slice::from_ref(&wallet)).unwrap();

        let loaded = file.get_wallets().unwrap();
        assert_eq!(loaded, vec![wallet]);
        assert_eq!(loaded[0].balance(), 7_000_000);
    }

    #[test]
    fn save_keeps_spend_password() {
        let dir = tempfile::tempdir().unwrap();
        let file = WalletFile::at(dir.path().join("wallets.json"));
        let verifier = PasswordVerifier::create("spend-password").unwrap();
        file.set_spend_password(verifier.clone()).unwrap();
        file.save(&[Wallet::new("main", "ccx7main")]).unwrap();

        assert_eq!(file.spend_password().unwrap(), Some(verifier));
        assert_eq!(file.get_wallets().unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let file = WalletFile::at(path.clone());
        file.set_spend_password(PasswordVerifier::create("spend-password").unwrap())
            .unwrap();
        file.save(&[Wallet::new("main", "ccx7main")]).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        assert!(!dir.path().join("wallets.json.tmp").exists());
    }

    #[test]
    fn corrupt_history_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        std::fs::write(
            &path,
            r#"{"wallets": [{"id": "w", "address": "a", "transactions": [
                {"hash": "h", "timestamp": 0, "amount": 5, "fee": 0, "direction": "received", "address": "x"},
                {"hash": "h", "timestamp": 1, "amount": 5, "fee": 0, "direction": "received", "address": "x"}
            ]}]}"#,
        )
        .unwrap();
        let err = WalletFile::at(path).get_wallets().unwrap_err();
        assert!(format!("{err:#}").contains("already recorded"));
    }
}
