/// Contract with the external wallet-sending action (signing + broadcast).
use futures::future::BoxFuture;
use zeroize::Zeroizing;

use crate::error::SubmissionError;
use crate::request::SendRequest;
use crate::wallet::Wallet;

/// A validated send, ready for the backend. Built only from requests that
/// passed every local check.
#[derive(Clone)]
pub struct SendOrder {
    pub from_address: String,
    pub to_address: String,
    pub amount: u64,
    pub fee: u64,
    pub payment_id: Option<String>,
    pub message: Option<String>,
    password: Zeroizing<String>,
}

impl std::fmt::Debug for SendOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendOrder")
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .field("amount", &self.amount)
            .field("fee", &self.fee)
            .finish_non_exhaustive()
    }
}

impl SendOrder {
    pub(crate) fn new(request: &SendRequest, from: &Wallet) -> Self {
        Self {
            from_address: from.address().to_string(),
            to_address: request.to_address.trim().to_string(),
            amount: request.amount,
            fee: request.fee,
            payment_id: request.payment_id.clone(),
            message: request.message.clone(),
            password: Zeroizing::new(request.password().to_string()),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Confirmation handed back by the backend on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub id: String,
}

/// The wallet-sending action. Each call resolves exactly once, with a
/// receipt or an error.
pub trait SendAction: Send + Sync {
    fn send(&self, order: SendOrder) -> BoxFuture<'_, Result<Receipt, SubmissionError>>;
}
