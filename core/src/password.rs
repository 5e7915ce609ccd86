/// Spending password rules and the stored password verifier.
///
/// Verifier format: base64(salt (32 bytes) || Argon2id hash (32 bytes))
use argon2::{Algorithm, Argon2, Params, Version};
use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{Result, SendError};
use crate::settings::UserSettings;

const SALT_LEN: usize = 32;
const HASH_LEN: usize = 32;

// Argon2id parameters for interactive unlock
const ARGON2_M_COST: u32 = 65536; // 64 MiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 1;

/// Length-only password rule. The minimum comes from user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    minimum_length: usize,
}

impl PasswordPolicy {
    pub fn new(minimum_length: usize) -> Self {
        Self { minimum_length }
    }

    pub fn from_settings(settings: &UserSettings) -> Self {
        Self::new(settings.minimum_password_length)
    }

    pub fn minimum_length(&self) -> usize {
        self.minimum_length
    }

    /// True iff the password is non-empty and at least `minimum_length`
    /// characters long.
    pub fn validate(&self, password: &str) -> bool {
        validate(password, self.minimum_length)
    }

    /// Like `validate`, but as a `Result` for `?` chains.
    pub fn check(&self, password: &str) -> Result<()> {
        if self.validate(password) {
            Ok(())
        } else {
            Err(SendError::PasswordTooShort {
                minimum: self.minimum_length.max(1),
            })
        }
    }
}

/// Free-standing form of `PasswordPolicy::validate`.
pub fn validate(password: &str, minimum_length: usize) -> bool {
    !password.is_empty() && password.chars().count() >= minimum_length
}

/// Salted Argon2id digest of the spending password. Never holds the
/// password itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordVerifier {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordVerifier").finish_non_exhaustive()
    }
}

impl PasswordVerifier {
    /// Derive a verifier for `password` under a fresh random salt.
    pub fn create(password: &str) -> Result<Self> {
        let salt: [u8; SALT_LEN] = rand::random();
        Self::with_salt(password, salt)
    }

    fn with_salt(password: &str, salt: [u8; SALT_LEN]) -> Result<Self> {
        let hash = derive(password.as_bytes(), &salt)?;
        Ok(Self { salt, hash })
    }

    pub fn verify(&self, password: &str) -> Result<bool> {
        let mut candidate = derive(password.as_bytes(), &self.salt)?;
        // Compare every byte so timing does not reveal the mismatch position.
        let diff = candidate
            .iter()
            .zip(self.hash.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        candidate.zeroize();
        Ok(diff == 0)
    }
}

fn derive(password: &[u8], salt: &[u8]) -> Result<[u8; HASH_LEN]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(HASH_LEN))
        .map_err(|_| SendError::Other(anyhow::anyhow!("invalid argon2 parameters")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut hash = [0u8; HASH_LEN];
    argon2
        .hash_password_into(password, salt, &mut hash)
        .map_err(|_| SendError::Other(anyhow::anyhow!("key derivation failed: argon2 internal error")))?;
    Ok(hash)
}

impl From<PasswordVerifier> for String {
    fn from(verifier: PasswordVerifier) -> Self {
        let mut bytes = Vec::with_capacity(SALT_LEN + HASH_LEN);
        bytes.extend_from_slice(&verifier.salt);
        bytes.extend_from_slice(&verifier.hash);
        Base64::encode_string(&bytes)
    }
}

impl TryFrom<String> for PasswordVerifier {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let bytes = Base64::decode_vec(&value)
            .map_err(|e| format!("Invalid password verifier encoding: {e}"))?;
        if bytes.len() != SALT_LEN + HASH_LEN {
            return Err(format!(
                "Password verifier must be {} bytes, got {}",
                SALT_LEN + HASH_LEN,
                bytes.len()
            ));
        }
        let mut salt = [0u8; SALT_LEN];
        let mut hash = [0u8; HASH_LEN];
        salt.copy_from_slice(&bytes[..SALT_LEN]);
        hash.copy_from_slice(&bytes[SALT_LEN..]);
        Ok(Self { salt, hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_property_across_minimums() {
        for minimum in [0usize, 1, 8, 64] {
            let policy = PasswordPolicy::new(minimum);
            for len in 0..=70 {
                let password = "p".repeat(len);
                let expected = len > 0 && len >= minimum;
                assert_eq!(policy.validate(&password), expected, "min {minimum} len {len}");
            }
        }
    }

    #[test]
    fn empty_always_rejected() {
        assert!(!validate("", 0));
        assert!(PasswordPolicy::new(0).check("").is_err());
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert!(validate("ääää", 4));
        assert!(!validate("äää", 4));
    }

    #[test]
    fn check_reports_minimum() {
        let err = PasswordPolicy::new(8).check("abc").unwrap_err();
        assert!(matches!(err, SendError::PasswordTooShort { minimum: 8 }));
    }

    #[test]
    fn from_settings_uses_configured_minimum() {
        let settings = UserSettings {
            minimum_password_length: 3,
            ..UserSettings::default()
        };
        assert!(PasswordPolicy::from_settings(&settings).validate("abc"));
    }

    #[test]
    fn verifier_accepts_right_password_only() {
        let verifier = PasswordVerifier::with_salt("correct horse", [7u8; SALT_LEN]).unwrap();
        assert!(verifier.verify("correct horse").unwrap());
        assert!(!verifier.verify("battery staple").unwrap());
    }

    #[test]
    fn verifier_string_encoding() {
        let verifier = PasswordVerifier::with_salt("secret-password", [1u8; SALT_LEN]).unwrap();
        let encoded: String = verifier.clone().into();
        let decoded = PasswordVerifier::try_from(encoded).unwrap();
        assert_eq!(decoded, verifier);
        assert!(PasswordVerifier::try_from("AAAA".to_string()).is_err());
        assert!(PasswordVerifier::try_from("not base64!!".to_string()).is_err());
    }

    #[test]
    fn verifier_debug_hides_material() {
        let verifier = PasswordVerifier::with_salt("secret-password", [1u8; SALT_LEN]).unwrap();
        let debug = format!("{verifier:?}");
        assert_eq!(debug, "PasswordVerifier { .. }");
    }
}
