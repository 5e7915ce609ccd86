use std::path::PathBuf;

use anyhow::Context;

pub mod coordinator;
pub mod display;
pub mod error;
pub mod mask;
pub mod outbox;
pub mod password;
pub mod recipient;
pub mod request;
pub mod service;
pub mod settings;
mod storage;
pub mod store;
pub mod summary;
pub mod wallet;
pub mod wallet_file;

pub use coordinator::{Navigator, NoopNavigator, Screen, SendAlert, SendCoordinator, SendPhase, SubmitOutcome};
pub use error::{MaskError, SendError, SubmissionError};
pub use mask::AddressMasker;
pub use outbox::{Outbox, OutboxEntry};
pub use password::{PasswordPolicy, PasswordVerifier};
pub use recipient::{PaymentId, Recipient};
pub use request::{SendField, SendRequest, SendRequestState};
pub use service::{Receipt, SendAction, SendOrder};
pub use settings::UserSettings;
pub use store::{StoreEvent, WalletStore};
pub use summary::{SummaryIcon, SummaryRow, TransactionSummaryBuilder};
pub use wallet::{Transaction, TransactionDirection, Wallet};
pub use wallet_file::{WalletFile, WalletSource};

/// XDG-compliant data directory for wallets, settings and the outbox.
/// Linux: `~/.local/share/ccx-wallet/`, macOS: `~/Library/Application Support/ccx-wallet/`
pub fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir()
        .context("Cannot determine data directory")?
        .join("ccx-wallet");
    Ok(dir)
}
