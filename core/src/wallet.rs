/// Wallet model: address, derived balance, and settled transaction history.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::display::CURRENCY;
use crate::error::{Result, SendError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Sent,
    Received,
}

impl std::fmt::Display for TransactionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Received => write!(f, "received"),
        }
    }
}

/// A settled transaction. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    /// Unix seconds.
    pub timestamp: i64,
    /// Net balance change in atomic units. Negative for sends, fee included.
    pub amount: i64,
    pub fee: u64,
    pub direction: TransactionDirection,
    /// Counterparty address.
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Transaction {
    pub fn received(hash: &str, timestamp: i64, amount: u64, from: &str) -> Result<Self> {
        Ok(Self {
            hash: hash.to_string(),
            timestamp,
            amount: signed(amount)?,
            fee: 0,
            direction: TransactionDirection::Received,
            address: from.to_string(),
            payment_id: None,
            message: None,
        })
    }

    /// Outgoing transfer of `amount` plus `fee`.
    pub fn sent(hash: &str, timestamp: i64, amount: u64, fee: u64, to: &str) -> Result<Self> {
        let total = amount
            .checked_add(fee)
            .ok_or_else(|| out_of_range(amount))
            .and_then(signed)?;
        Ok(Self {
            hash: hash.to_string(),
            timestamp,
            amount: -total,
            fee,
            direction: TransactionDirection::Sent,
            address: to.to_string(),
            payment_id: None,
            message: None,
        })
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_payment_id(mut self, payment_id: &str) -> Self {
        self.payment_id = Some(payment_id.to_string());
        self
    }
}

fn out_of_range(amount: u64) -> SendError {
    SendError::InvalidAmount(format!("Amount {amount} is out of range."))
}

fn signed(amount: u64) -> Result<i64> {
    i64::try_from(amount).map_err(|_| out_of_range(amount))
}

/// On-disk shape of a wallet. The balance is never stored; it is rebuilt
/// from the history on load.
#[derive(Serialize, Deserialize)]
struct WalletRecord {
    id: String,
    address: String,
    #[serde(default = "default_unit")]
    unit: String,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

fn default_unit() -> String {
    CURRENCY.to_string()
}

/// A wallet as mirrored from the external ledger. The balance always
/// equals the net sum of the recorded transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WalletRecord", into = "WalletRecord")]
pub struct Wallet {
    id: String,
    address: String,
    unit: String,
    balance: u64,
    transactions: Vec<Transaction>,
    hashes: HashSet<String>,
}

impl Wallet {
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            unit: default_unit(),
            balance: 0,
            transactions: Vec::new(),
            hashes: HashSet::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// Replay a history in chronological order.
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Result<Self> {
        for tx in transactions {
            self.apply(tx)?;
        }
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction(&self, hash: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.hash == hash)
    }

    /// Balance left for the amount once `fee` is reserved.
    pub fn spendable(&self, fee: u64) -> u64 {
        self.balance.saturating_sub(fee)
    }

    /// Append a settled transaction and move the balance by its amount.
    pub(crate) fn apply(&mut self, tx: Transaction) -> Result<()> {
        if tx.hash.trim().is_empty() {
            return Err(SendError::InvalidState(
                "Transaction hash cannot be empty.".into(),
            ));
        }
        if self.hashes.contains(&tx.hash) {
            return Err(SendError::InvalidState(format!(
                "Transaction {} is already recorded for wallet '{}'.",
                tx.hash, self.id
            )));
        }
        let sign_ok = match tx.direction {
            TransactionDirection::Sent => tx.amount <= 0,
            TransactionDirection::Received => tx.amount >= 0,
        };
        if !sign_ok {
            return Err(SendError::InvalidState(format!(
                "Transaction {} is marked {} but has amount {}.",
                tx.hash, tx.direction, tx.amount
            )));
        }

        let next = i128::from(self.balance) + i128::from(tx.amount);
        let balance = u64::try_from(next).map_err(|_| {
            SendError::InvalidState(format!(
                "Transaction {} would move wallet '{}' balance out of range.",
                tx.hash, self.id
            ))
        })?;

        self.balance = balance;
        self.hashes.insert(tx.hash.clone());
        self.transactions.push(tx);
        Ok(())
    }
}

impl TryFrom<WalletRecord> for Wallet {
    type Error = SendError;

    fn try_from(record: WalletRecord) -> Result<Self> {
        Wallet::new(record.id, record.address)
            .with_unit(record.unit)
            .with_transactions(record.transactions)
    }
}

impl From<Wallet> for WalletRecord {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            address: wallet.address,
            unit: wallet.unit,
            transactions: wallet.transactions,
        }
    }
}
