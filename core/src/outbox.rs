use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::error::SubmissionError;
use crate::password::PasswordVerifier;
use crate::service::{Receipt, SendAction, SendOrder};
use crate::storage::write_private;

/// A send accepted locally and waiting for the daemon to sign and broadcast
/// it. Never holds the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: u64,
    pub fee: u64,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub queued_at: i64,
}

/// File format (JSON): `{ "next_id": <u64>, "entries": [OutboxEntry, ...] }`
///
/// The daemon removes entries it has processed but keeps `next_id`, so a
/// receipt id is never handed out twice.
#[derive(Debug, Default, Serialize, Deserialize)]
struct OutboxData {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    entries: Vec<OutboxEntry>,
}

impl OutboxData {
    /// Next free id: past both the stored counter and every queued id.
    fn allocate_id(&mut self) -> u64 {
        let highest = self
            .entries
            .iter()
            .filter_map(|e| e.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let id = self.next_id.max(highest.saturating_add(1)).max(1);
        self.next_id = id.saturating_add(1);
        id
    }
}

/// Local send backend: checks the spending password and appends the order
/// to a JSON queue file.
///
/// Path: `data_dir()/outbox.json`
pub struct Outbox {
    path: PathBuf,
    verifier: PasswordVerifier,
    data: tokio::sync::Mutex<OutboxData>,
}

impl Outbox {
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::data_dir()?.join("outbox.json"))
    }

    /// Open (or create) the outbox at a specific path.
    pub fn open_at(path: PathBuf, verifier: PasswordVerifier) -> Result<Self> {
        let data = if path.exists() {
            let json = std::fs::read_to_string(&path).context("Failed to read outbox.json")?;
            serde_json::from_str(&json).context("Invalid outbox.json")?
        } else {
            OutboxData::default()
        };
        Ok(Self {
            path,
            verifier,
            data: tokio::sync::Mutex::new(data),
        })
    }

    pub async fn entries(&self) -> Vec<OutboxEntry> {
        self.data.lock().await.entries.clone()
    }

    /// Argon2 is CPU bound; run it off the async worker.
    async fn check_password(&self, password: &str) -> std::result::Result<bool, SubmissionError> {
        let verifier = self.verifier.clone();
        let password = Zeroizing::new(password.to_string());
        tokio::task::spawn_blocking(move || verifier.verify(&password))
            .await
            .map_err(|e| SubmissionError::Unavailable(format!("Password check failed: {e}")))?
            .map_err(|e| SubmissionError::Unavailable(e.to_string()))
    }

    async fn enqueue(&self, order: SendOrder) -> std::result::Result<Receipt, SubmissionError> {
        if !self.check_password(order.password()).await? {
            warn!(from = %order.from_address, "outbox rejected send: wrong spending password");
            return Err(SubmissionError::Rejected("Incorrect spending password.".into()));
        }

        let mut data = self.data.lock().await;
        let previous_next = data.next_id;
        let id = format!("{:08}", data.allocate_id());
        data.entries.push(OutboxEntry {
            id: id.clone(),
            from_address: order.from_address,
            to_address: order.to_address,
            amount: order.amount,
            fee: order.fee,
            payment_id: order.payment_id,
            message: order.message,
            queued_at: chrono::Utc::now().timestamp(),
        });
        if let Err(e) = save(&self.path, &data) {
            data.entries.pop();
            data.next_id = previous_next;
            return Err(SubmissionError::Unavailable(format!("{e:#}")));
        }
        info!(%id, "send queued in outbox");
        Ok(Receipt { id })
    }
}

impl SendAction for Outbox {
    fn send(&self, order: SendOrder) -> BoxFuture<'_, std::result::Result<Receipt, SubmissionError>> {
        Box::pin(self.enqueue(order))
    }
}

fn save(path: &Path, data: &OutboxData) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize outbox")?;
    write_private(path, json.as_bytes()).context("Failed to write outbox.json")
}
