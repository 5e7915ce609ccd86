//! Single source of truth for the wallet screens: wallets, the selection,
//! and the in-progress send request.
//!
//! All mutation goes through methods on `WalletStore`; each one broadcasts a
//! `StoreEvent` so views can re-render without polling.

use std::collections::HashSet;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::coordinator::SendPhase;
use crate::error::{Result, SendError};
use crate::request::{SendField, SendRequest, SendRequestState};
use crate::wallet::{Transaction, Wallet};
use crate::wallet_file::WalletSource;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    WalletSelected { index: usize },
    TransactionRecorded { wallet_id: String, hash: String },
    SendRequestChanged,
    SendRequestCleared,
    SendPhaseChanged { from: SendPhase, to: SendPhase },
}

pub struct WalletStore {
    wallets: Vec<Wallet>,
    selected: usize,
    send: SendRequestState,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for WalletStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletStore")
            .field("wallets", &self.wallets.len())
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl WalletStore {
    /// Build a store over `wallets`, selecting the first. At least one wallet
    /// is required and ids must be unique.
    pub fn new(wallets: Vec<Wallet>) -> Result<Self> {
        if wallets.is_empty() {
            return Err(SendError::InvalidState(
                "No wallets available. Create or import a wallet first.".into(),
            ));
        }
        let mut seen = HashSet::new();
        for wallet in &wallets {
            if !seen.insert(wallet.id()) {
                return Err(SendError::InvalidState(format!(
                    "Duplicate wallet id '{}'.",
                    wallet.id()
                )));
            }
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            wallets,
            selected: 0,
            send: SendRequestState::default(),
            events,
        })
    }

    pub fn load(source: &dyn WalletSource) -> Result<Self> {
        let wallets = source
            .get_wallets()
            .map_err(|e| SendError::Storage(format!("{e:#}")))?;
        let store = Self::new(wallets)?;
        info!(wallets = store.wallets.len(), "wallet store loaded");
        Ok(store)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_wallet(&self) -> &Wallet {
        &self.wallets[self.selected]
    }

    pub fn wallet(&self, id: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.id() == id)
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        if index >= self.wallets.len() {
            return Err(SendError::InvalidState(format!(
                "Wallet index {index} out of range (have {}).",
                self.wallets.len()
            )));
        }
        if index != self.selected {
            self.selected = index;
            debug!(index, wallet = self.wallets[index].id(), "wallet selected");
            self.notify(StoreEvent::WalletSelected { index });
        }
        Ok(())
    }

    pub fn select_by_id(&mut self, id: &str) -> Result<()> {
        let index = self
            .wallets
            .iter()
            .position(|w| w.id() == id)
            .ok_or_else(|| SendError::UnknownWallet(id.to_string()))?;
        self.select(index)
    }

    /// Apply a settled transaction reported by the backend.
    pub fn record_transaction(&mut self, wallet_id: &str, tx: Transaction) -> Result<()> {
        let wallet = self
            .wallets
            .iter_mut()
            .find(|w| w.id() == wallet_id)
            .ok_or_else(|| SendError::UnknownWallet(wallet_id.to_string()))?;
        let hash = tx.hash.clone();
        wallet.apply(tx)?;
        debug!(wallet = wallet_id, %hash, balance = wallet.balance(), "transaction recorded");
        self.notify(StoreEvent::TransactionRecorded {
            wallet_id: wallet_id.to_string(),
            hash,
        });
        Ok(())
    }

    pub fn send_request(&self) -> &SendRequest {
        self.send.request()
    }

    /// Wallet the current request was opened against.
    pub fn send_wallet(&self) -> Option<&Wallet> {
        self.send
            .request()
            .wallet_id
            .as_deref()
            .and_then(|id| self.wallet(id))
    }

    pub fn update_send_request(&mut self, field: SendField) {
        debug!(?field, "send request updated");
        self.send.apply(field);
        self.notify(StoreEvent::SendRequestChanged);
    }

    pub fn toggle_secure_password_entry(&mut self) {
        self.send.toggle_secure_password_entry();
        self.notify(StoreEvent::SendRequestChanged);
    }

    /// Start a fresh request tied to the selected wallet. Returns its id.
    pub(crate) fn begin_send_request(&mut self) -> String {
        let wallet_id = self.selected_wallet().id().to_string();
        self.send.begin(&wallet_id);
        self.notify(StoreEvent::SendRequestChanged);
        wallet_id
    }

    pub fn reset_send_request(&mut self) {
        self.send.reset();
        self.notify(StoreEvent::SendRequestCleared);
    }

    pub(crate) fn clear_send_password(&mut self) {
        self.send.clear_password();
        self.notify(StoreEvent::SendRequestChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> WalletStore {
        WalletStore::new(vec![
            Wallet::new("main", "ccx7main"),
            Wallet::new("savings", "ccx7savings"),
        ])
        .unwrap()
    }

    #[test]
    fn empty_store_rejected() {
        assert!(WalletStore::new(Vec::new()).is_err());
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = WalletStore::new(vec![Wallet::new("a", "x"), Wallet::new("a", "y")]).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn first_wallet_selected() {
        let store = store();
        assert_eq!(store.selected_index(), 0);
        assert_eq!(store.selected_wallet().id(), "main");
    }

    #[test]
    fn select_notifies_and_persists() {
        let mut store = store();
        let mut rx = store.subscribe();
        store.select(1).unwrap();
        assert_eq!(store.selected_wallet().id(), "savings");
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::WalletSelected { index: 1 });

        // Re-selecting the same wallet is silent.
        store.select(1).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn select_out_of_range_keeps_selection() {
        let mut store = store();
        assert!(store.select(5).is_err());
        assert_eq!(store.selected_index(), 0);
        assert!(matches!(store.select_by_id("nope"), Err(SendError::UnknownWallet(_))));
    }

    #[test]
    fn record_transaction_updates_balance() {
        let mut store = store();
        let mut rx = store.subscribe();
        store
            .record_transaction("savings", Transaction::received("h1", 0, 3_000_000, "ccx7x").unwrap())
            .unwrap();
        assert_eq!(store.wallet("savings").unwrap().balance(), 3_000_000);
        assert_eq!(
            rx.try_recv().unwrap(),
            StoreEvent::TransactionRecorded {
                wallet_id: "savings".into(),
                hash: "h1".into()
            }
        );
        assert!(store
            .record_transaction("ghost", Transaction::received("h2", 0, 1, "x").unwrap())
            .is_err());
    }

    #[test]
    fn send_request_lifecycle() {
        let mut store = store();
        let mut rx = store.subscribe();

        let id = store.begin_send_request();
        assert_eq!(id, "main");
        assert_eq!(store.send_wallet().unwrap().id(), "main");
        store.update_send_request(SendField::ToAddress("ccx7dest".into()));
        store.toggle_secure_password_entry();
        assert_eq!(store.send_request().to_address, "ccx7dest");
        assert!(!store.send_request().secure_password_entry);

        store.reset_send_request();
        assert!(store.send_request().is_empty());
        assert!(store.send_wallet().is_none());

        let events: Vec<StoreEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            events,
            vec![
                StoreEvent::SendRequestChanged,
                StoreEvent::SendRequestChanged,
                StoreEvent::SendRequestChanged,
                StoreEvent::SendRequestCleared,
            ]
        );
    }
}
