use std::fmt;

use crate::error::{Result, SendError};

pub const PAYMENT_ID_LEN: usize = 64;

/// A syntactically plausible destination address. Checksums and network
/// prefixes are left to the daemon that signs the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(String);

impl Recipient {
    /// Trim and reject empty input or input with embedded whitespace or
    /// control characters.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SendError::InvalidRecipient(
                "Recipient address cannot be empty.".into(),
            ));
        }
        if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SendError::InvalidRecipient(format!(
                "Invalid recipient '{input}'. Addresses cannot contain spaces."
            )));
        }
        Ok(Recipient(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Conceal payment id: 64 hex characters, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.len() != PAYMENT_ID_LEN || !input.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SendError::InvalidPaymentId(format!(
                "Invalid payment id '{input}'. Expected {PAYMENT_ID_LEN} hex characters."
            )));
        }
        Ok(PaymentId(input.to_lowercase()))
    }

    /// Blank input means "no payment id".
    pub fn parse_optional(input: Option<&str>) -> Result<Option<Self>> {
        match input.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address() {
        let r = Recipient::parse("  ccx7Xd3NBbBiQNvv7vMLXmGMHyS8AVB6  ").unwrap();
        assert_eq!(r.as_str(), "ccx7Xd3NBbBiQNvv7vMLXmGMHyS8AVB6");
        assert_eq!(r.to_string(), "ccx7Xd3NBbBiQNvv7vMLXmGMHyS8AVB6");
    }

    #[test]
    fn accepts_display_style_addresses() {
        assert!(Recipient::parse("CCX123...789").is_ok());
    }

    #[test]
    fn reject_empty() {
        assert!(Recipient::parse("").is_err());
        assert!(Recipient::parse("   ").is_err());
    }

    #[test]
    fn reject_inner_whitespace() {
        let err = Recipient::parse("ccx7 abc").unwrap_err();
        assert!(matches!(err, SendError::InvalidRecipient(_)));
        assert!(Recipient::parse("ccx7\tabc").is_err());
    }

    #[test]
    fn payment_id_normalized() {
        let id = "AB".repeat(32);
        let parsed = PaymentId::parse(&id).unwrap();
        assert_eq!(parsed.as_str(), "ab".repeat(32));
    }

    #[test]
    fn payment_id_rejects_bad_length_or_chars() {
        assert!(PaymentId::parse("abcd").is_err());
        assert!(PaymentId::parse(&"g".repeat(64)).is_err());
        assert!(PaymentId::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn optional_payment_id() {
        assert_eq!(PaymentId::parse_optional(None).unwrap(), None);
        assert_eq!(PaymentId::parse_optional(Some("  ")).unwrap(), None);
        assert!(PaymentId::parse_optional(Some(&"0".repeat(64))).unwrap().is_some());
        assert!(PaymentId::parse_optional(Some("zz")).is_err());
    }
}
