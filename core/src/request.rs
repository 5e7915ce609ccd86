/// The in-progress send: typed record plus the field-level setters screens use.
use zeroize::Zeroizing;

use crate::display::TRANSACTION_FEE;

/// Everything the compose and confirm screens collect for one send.
///
/// The password is write-only from the outside: it can be set and read back
/// for submission, but is never serialized and is redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Wallet the request was opened against.
    pub wallet_id: Option<String>,
    pub to_address: String,
    /// Atomic units. Zero means "not entered yet".
    pub amount: u64,
    pub payment_id: Option<String>,
    pub message: Option<String>,
    pub label: Option<String>,
    password: Zeroizing<String>,
    pub secure_password_entry: bool,
    pub fee: u64,
}

impl Default for SendRequest {
    fn default() -> Self {
        Self {
            wallet_id: None,
            to_address: String::new(),
            amount: 0,
            payment_id: None,
            message: None,
            label: None,
            password: Zeroizing::new(String::new()),
            secure_password_entry: true,
            fee: TRANSACTION_FEE,
        }
    }
}

impl std::fmt::Debug for SendRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendRequest")
            .field("wallet_id", &self.wallet_id)
            .field("to_address", &self.to_address)
            .field("amount", &self.amount)
            .field("payment_id", &self.payment_id)
            .field("message", &self.message)
            .field("label", &self.label)
            .field("password", &"<redacted>")
            .field("secure_password_entry", &self.secure_password_entry)
            .field("fee", &self.fee)
            .finish()
    }
}

impl SendRequest {
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    /// The message row shows this verbatim; an unset message renders empty.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// True when no user-entered field holds a value.
    pub fn is_empty(&self) -> bool {
        self.wallet_id.is_none()
            && self.to_address.is_empty()
            && self.amount == 0
            && self.payment_id.is_none()
            && self.message.is_none()
            && self.label.is_none()
            && self.password.is_empty()
    }
}

/// A single field update, as dispatched by the compose and confirm screens.
#[derive(Clone, PartialEq, Eq)]
pub enum SendField {
    ToAddress(String),
    Amount(u64),
    PaymentId(String),
    Message(String),
    Label(String),
    Password(Zeroizing<String>),
    SecurePasswordEntry(bool),
}

impl std::fmt::Debug for SendField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToAddress(v) => f.debug_tuple("ToAddress").field(v).finish(),
            Self::Amount(v) => f.debug_tuple("Amount").field(v).finish(),
            Self::PaymentId(v) => f.debug_tuple("PaymentId").field(v).finish(),
            Self::Message(v) => f.debug_tuple("Message").field(v).finish(),
            Self::Label(v) => f.debug_tuple("Label").field(v).finish(),
            Self::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
            Self::SecurePasswordEntry(v) => f.debug_tuple("SecurePasswordEntry").field(v).finish(),
        }
    }
}

/// Owner of the current `SendRequest`. Every setter replaces exactly one
/// field; only `reset` and `begin` touch the whole record.
#[derive(Debug, Default)]
pub struct SendRequestState {
    request: SendRequest,
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl SendRequestState {
    pub fn request(&self) -> &SendRequest {
        &self.request
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty()
    }

    /// Start a fresh request for `wallet_id`, discarding any previous one.
    pub fn begin(&mut self, wallet_id: &str) {
        self.reset();
        self.request.wallet_id = Some(wallet_id.to_string());
    }

    /// Clear every field back to its default.
    pub fn reset(&mut self) {
        self.request = SendRequest::default();
    }

    pub fn set_to_address(&mut self, to_address: &str) {
        self.request.to_address = to_address.to_string();
    }

    pub fn set_amount(&mut self, amount: u64) {
        self.request.amount = amount;
    }

    pub fn set_payment_id(&mut self, payment_id: &str) {
        self.request.payment_id = non_blank(payment_id);
    }

    pub fn set_message(&mut self, message: &str) {
        self.request.message = non_blank(message);
    }

    pub fn set_label(&mut self, label: &str) {
        self.request.label = non_blank(label);
    }

    pub fn set_password(&mut self, password: Zeroizing<String>) {
        self.request.password = password;
    }

    pub fn clear_password(&mut self) {
        self.request.password = Zeroizing::new(String::new());
    }

    pub fn set_secure_password_entry(&mut self, secure: bool) {
        self.request.secure_password_entry = secure;
    }

    pub fn toggle_secure_password_entry(&mut self) {
        self.request.secure_password_entry = !self.request.secure_password_entry;
    }

    pub fn apply(&mut self, field: SendField) {
        match field {
            SendField::ToAddress(v) => self.set_to_address(&v),
            SendField::Amount(v) => self.set_amount(v),
            SendField::PaymentId(v) => self.set_payment_id(&v),
            SendField::Message(v) => self.set_message(&v),
            SendField::Label(v) => self.set_label(&v),
            SendField::Password(v) => self.set_password(v),
            SendField::SecurePasswordEntry(v) => self.set_secure_password_entry(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SendRequestState {
        let mut state = SendRequestState::default();
        state.begin("main");
        state.set_to_address("ccx7dest");
        state.set_amount(10_000_000);
        state.set_payment_id(&"a".repeat(64));
        state.set_message("hi");
        state.set_label("rent");
        state.set_password(Zeroizing::new("hunter22".into()));
        state
    }

    #[test]
    fn setters_touch_one_field() {
        let mut state = filled();
        let before = state.request().clone();
        state.set_message("changed");

        let after = state.request();
        assert_eq!(after.message.as_deref(), Some("changed"));
        assert_eq!(after.to_address, before.to_address);
        assert_eq!(after.amount, before.amount);
        assert_eq!(after.payment_id, before.payment_id);
        assert_eq!(after.label, before.label);
        assert_eq!(after.password(), before.password());
        assert_eq!(after.wallet_id, before.wallet_id);
    }

    #[test]
    fn blank_optionals_become_none() {
        let mut state = filled();
        state.set_message("   ");
        state.set_payment_id("");
        assert_eq!(state.request().message, None);
        assert_eq!(state.request().payment_id, None);
        assert_eq!(state.request().message_text(), "");
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = filled();
        state.toggle_secure_password_entry();
        state.reset();
        assert!(state.is_empty());
        assert_eq!(state.request(), &SendRequest::default());
        assert!(state.request().secure_password_entry);
        assert_eq!(state.request().fee, TRANSACTION_FEE);
    }

    #[test]
    fn begin_replaces_rather_than_merges() {
        let mut state = filled();
        state.begin("savings");
        let req = state.request();
        assert_eq!(req.wallet_id.as_deref(), Some("savings"));
        assert!(req.to_address.is_empty());
        assert_eq!(req.amount, 0);
        assert!(req.message.is_none());
        assert!(!req.has_password());
    }

    #[test]
    fn clear_password_keeps_other_fields() {
        let mut state = filled();
        state.clear_password();
        assert!(!state.request().has_password());
        assert_eq!(state.request().to_address, "ccx7dest");
        assert_eq!(state.request().message.as_deref(), Some("hi"));
    }

    #[test]
    fn apply_dispatches_to_setters() {
        let mut state = SendRequestState::default();
        state.apply(SendField::ToAddress("ccx7x".into()));
        state.apply(SendField::Amount(5));
        state.apply(SendField::Label("l".into()));
        state.apply(SendField::Password(Zeroizing::new("pw".into())));
        state.apply(SendField::SecurePasswordEntry(false));
        let req = state.request();
        assert_eq!(req.to_address, "ccx7x");
        assert_eq!(req.amount, 5);
        assert_eq!(req.label.as_deref(), Some("l"));
        assert_eq!(req.password(), "pw");
        assert!(!req.secure_password_entry);
    }

    #[test]
    fn debug_redacts_password() {
        let state = filled();
        let debug = format!("{:?}", state.request());
        assert!(!debug.contains("hunter22"));
        assert!(debug.contains("<redacted>"));
        let field = format!("{:?}", SendField::Password(Zeroizing::new("hunter22".into())));
        assert!(!field.contains("hunter22"));
    }
}
