//! Send flow state machine.
//!
//! `Idle -> Composing -> Confirming -> Submitting -> {Completed, Failed}`.
//! A failed submission lands back in `Confirming` with the password cleared
//! so the user can retry without re-entering the other fields.
//!
//! The coordinator never owns shared state: every transition takes the
//! `WalletStore` by reference and mutates it through its entry points.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::display::format_balance;
use crate::error::{Result, SendError, SubmissionError};
use crate::password::PasswordPolicy;
use crate::recipient::{PaymentId, Recipient};
use crate::request::SendRequest;
use crate::service::{Receipt, SendAction, SendOrder};
use crate::store::{StoreEvent, WalletStore};
use crate::wallet::Wallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SendPhase {
    Idle,
    Composing,
    Confirming,
    Submitting,
    Completed,
    Failed,
}

impl fmt::Display for SendPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Composing => write!(f, "composing"),
            Self::Confirming => write!(f, "confirming"),
            Self::Submitting => write!(f, "submitting"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Wallet,
    SendConfirm,
}

/// Screen transition primitives. The coordinator decides when to call them.
pub trait Navigator: Send {
    fn go_back(&mut self);
    fn navigate(&mut self, screen: Screen);
}

#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn go_back(&mut self) {}
    fn navigate(&mut self, _screen: Screen) {}
}

/// Blocking, dismissible notice shown after a send did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendAlert {
    pub title: String,
    pub message: String,
}

impl From<&SubmissionError> for SendAlert {
    fn from(err: &SubmissionError) -> Self {
        Self {
            title: "Send failed".into(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Receipt),
    /// The backend refused; the flow is back in `Confirming`.
    Failed(SubmissionError),
    /// A submission was already in flight.
    Ignored,
}

pub struct SendCoordinator {
    action: Arc<dyn SendAction>,
    policy: PasswordPolicy,
    navigator: Box<dyn Navigator>,
    phase: SendPhase,
    alert: Option<SendAlert>,
    receipt: Option<Receipt>,
}

impl fmt::Debug for SendCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendCoordinator")
            .field("phase", &self.phase)
            .field("policy", &self.policy)
            .field("alert", &self.alert)
            .finish_non_exhaustive()
    }
}

impl SendCoordinator {
    pub fn new(action: Arc<dyn SendAction>, policy: PasswordPolicy) -> Self {
        Self {
            action,
            policy,
            navigator: Box::new(NoopNavigator),
            phase: SendPhase::Idle,
            alert: None,
            receipt: None,
        }
    }

    pub fn with_navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn alert(&self) -> Option<&SendAlert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    fn set_phase(&mut self, store: &WalletStore, to: SendPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        info!(%from, %to, "send phase changed");
        store.notify(StoreEvent::SendPhaseChanged { from, to });
    }

    /// Open the compose dialog with a fresh request for the selected wallet.
    /// Any earlier unsent request is discarded.
    pub fn open_compose(&mut self, store: &mut WalletStore) -> Result<()> {
        if self.phase == SendPhase::Submitting {
            return Err(SendError::InvalidState(
                "A send is already being submitted.".into(),
            ));
        }
        let wallet_id = store.begin_send_request();
        debug!(wallet = %wallet_id, "compose opened");
        self.alert = None;
        self.receipt = None;
        self.set_phase(store, SendPhase::Composing);
        Ok(())
    }

    /// Submit the compose form. On success the flow moves to the
    /// confirmation screen; on a validation error nothing changes.
    pub fn confirm(&mut self, store: &mut WalletStore) -> Result<()> {
        if self.phase != SendPhase::Composing {
            return Err(SendError::InvalidState(format!(
                "Cannot confirm while {}.",
                self.phase
            )));
        }
        let wallet = request_wallet(store)?;
        check_request(store.send_request(), wallet)?;
        self.set_phase(store, SendPhase::Confirming);
        self.navigator.navigate(Screen::SendConfirm);
        Ok(())
    }

    /// Whether the confirm screen's submit control is enabled.
    pub fn can_submit(&self, store: &WalletStore) -> bool {
        self.phase == SendPhase::Confirming && self.policy.validate(store.send_request().password())
    }

    /// First half of a submission: run the guards, move to `Submitting`,
    /// and hand back the order for the send action. Returns `None` when a
    /// submission is already in flight.
    pub fn begin_submit(&mut self, store: &mut WalletStore) -> Result<Option<SendOrder>> {
        match self.phase {
            SendPhase::Submitting => {
                debug!("submit ignored: send already in flight");
                return Ok(None);
            }
            SendPhase::Confirming => {}
            other => {
                return Err(SendError::InvalidState(format!("Cannot submit while {other}.")));
            }
        }

        let order = {
            let request = store.send_request();
            self.policy.check(request.password())?;
            let wallet = request_wallet(store)?;
            check_request(request, wallet)?;
            SendOrder::new(request, wallet)
        };

        self.alert = None;
        self.set_phase(store, SendPhase::Submitting);
        Ok(Some(order))
    }

    /// Second half of a submission: apply the send action's outcome.
    pub fn complete_submit(
        &mut self,
        store: &mut WalletStore,
        result: std::result::Result<Receipt, SubmissionError>,
    ) -> Result<SubmitOutcome> {
        if self.phase != SendPhase::Submitting {
            return Err(SendError::InvalidState(
                "No send is being submitted.".into(),
            ));
        }
        match result {
            Ok(receipt) => {
                info!(id = %receipt.id, "send completed");
                self.set_phase(store, SendPhase::Completed);
                store.reset_send_request();
                self.receipt = Some(receipt.clone());
                self.navigator.go_back();
                Ok(SubmitOutcome::Completed(receipt))
            }
            Err(err) => {
                warn!(error = %err, "send failed");
                self.set_phase(store, SendPhase::Failed);
                self.alert = Some(SendAlert::from(&err));
                store.clear_send_password();
                self.set_phase(store, SendPhase::Confirming);
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    /// Validate, call the send action, and apply its outcome.
    pub async fn submit(&mut self, store: &mut WalletStore) -> Result<SubmitOutcome> {
        let Some(order) = self.begin_submit(store)? else {
            return Ok(SubmitOutcome::Ignored);
        };
        let action = Arc::clone(&self.action);
        let result = action.send(order).await;
        self.complete_submit(store, result)
    }

    /// Abandon the send from any pre-submit phase.
    pub fn cancel(&mut self, store: &mut WalletStore) -> Result<()> {
        match self.phase {
            SendPhase::Submitting => Err(SendError::InvalidState(
                "Cannot cancel a send that is being submitted.".into(),
            )),
            SendPhase::Composing => {
                store.reset_send_request();
                self.set_phase(store, SendPhase::Idle);
                Ok(())
            }
            SendPhase::Confirming | SendPhase::Failed => {
                store.reset_send_request();
                self.alert = None;
                self.set_phase(store, SendPhase::Idle);
                self.navigator.go_back();
                Ok(())
            }
            SendPhase::Idle | SendPhase::Completed => {
                self.set_phase(store, SendPhase::Idle);
                Ok(())
            }
        }
    }
}

fn request_wallet(store: &WalletStore) -> Result<&Wallet> {
    store.send_wallet().ok_or_else(|| {
        SendError::InvalidState("The send request is not tied to a known wallet.".into())
    })
}

/// Local checks run before confirming and again before submitting.
fn check_request(request: &SendRequest, wallet: &Wallet) -> Result<()> {
    Recipient::parse(&request.to_address)?;
    if request.amount == 0 {
        return Err(SendError::InvalidAmount(
            "Amount must be greater than zero.".into(),
        ));
    }
    PaymentId::parse_optional(request.payment_id.as_deref())?;

    let required = request
        .amount
        .checked_add(request.fee)
        .ok_or_else(|| SendError::InvalidAmount("Amount too large.".into()))?;
    if required > wallet.balance() {
        return Err(SendError::InsufficientBalance(format!(
            "Insufficient balance: sending {} needs {} including fee, but only {} is available.",
            format_balance(request.amount, wallet.unit()),
            format_balance(required, wallet.unit()),
            format_balance(wallet.balance(), wallet.unit()),
        )));
    }
    Ok(())
}
