/// Confirmation summary shown before a send is submitted.
use crate::display::format_fee;
use crate::mask::AddressMasker;
use crate::request::SendRequest;
use crate::wallet::Wallet;

pub const FROM_TITLE: &str = "From address";
pub const TO_TITLE: &str = "To address";
pub const FEE_TITLE: &str = "Transaction Fee";
pub const MESSAGE_TITLE: &str = "Message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryIcon {
    Mail,
    Cash,
}

impl SummaryIcon {
    /// Icon identifier understood by the screens' icon set.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mail => "md-mail",
            Self::Cash => "md-cash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub value: String,
    pub title: &'static str,
    pub icon: SummaryIcon,
}

impl SummaryRow {
    fn new(value: String, title: &'static str, icon: SummaryIcon) -> Self {
        Self { value, title, icon }
    }
}

/// Builds the four summary rows: from, to, fee, message. Does no validation
/// of its own; an empty recipient still yields a (blank) "to" row.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionSummaryBuilder {
    masker: AddressMasker,
}

impl TransactionSummaryBuilder {
    pub fn new(masker: AddressMasker) -> Self {
        Self { masker }
    }

    pub fn build(&self, request: &SendRequest, from: &Wallet) -> Vec<SummaryRow> {
        vec![
            SummaryRow::new(self.masker.mask(from.address()), FROM_TITLE, SummaryIcon::Mail),
            SummaryRow::new(self.masker.mask(&request.to_address), TO_TITLE, SummaryIcon::Mail),
            SummaryRow::new(format_fee(request.fee, from.unit()), FEE_TITLE, SummaryIcon::Cash),
            SummaryRow::new(request.message_text().to_string(), MESSAGE_TITLE, SummaryIcon::Mail),
        ]
    }
}
