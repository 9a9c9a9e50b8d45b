//! Credential codec: one-way password hashing and verification
//!
//! A stored credential is `hex(derived_key) + "." + hex(salt)`, where the
//! key is a 64-byte Argon2id output over the password and a fresh 16-byte
//! random salt. Both directions share the same fixed KDF parameters;
//! changing them invalidates every stored credential and requires a
//! migration.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::{RngCore, rngs::OsRng};
use subtle::ConstantTimeEq;
use thiserror::Error;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 64;
const SEPARATOR: char = '.';

// Argon2id cost parameters. Fixed for the lifetime of the stored
// credentials (see module docs).
const M_COST_KIB: u32 = 19_456;
const T_COST: u32 = 2;
const P_COST: u32 = 1;

/// Password hashing errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Error during key derivation.
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

fn kdf() -> Argon2<'static> {
    let params =
        Params::new(M_COST_KIB, T_COST, P_COST, Some(KEY_LEN)).expect("valid Argon2 parameters");
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
}

/// Hashes a password into its stored representation.
///
/// Every call draws a fresh salt, so hashing the same password twice
/// yields two different stored strings.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut key = [0u8; KEY_LEN];
    kdf()
        .hash_password_into(plaintext.as_bytes(), &salt, &mut key)
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Ok(format!(
        "{}{}{}",
        hex::encode(key),
        SEPARATOR,
        hex::encode(salt)
    ))
}

/// Verifies a password attempt against a stored credential.
///
/// Fails closed: any malformed stored value (missing separator, bad hex,
/// wrong lengths) is a verification failure, never a panic or an error.
/// Matching derived keys are compared in constant time.
pub fn verify_password(plaintext: &str, stored: &str) -> bool {
    let Some((key_hex, salt_hex)) = stored.split_once(SEPARATOR) else {
        return false;
    };
    let Ok(expected) = hex::decode(key_hex) else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    // Length check before the comparison; lengths are public once the
    // format is parsed, so this short-circuit leaks nothing.
    if expected.len() != KEY_LEN || salt.len() != SALT_LEN {
        return false;
    }

    let mut derived = [0u8; KEY_LEN];
    if kdf()
        .hash_password_into(plaintext.as_bytes(), &salt, &mut derived)
        .is_err()
    {
        return false;
    }

    derived.as_slice().ct_eq(expected.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let stored = hash_password("Secret123").unwrap();
        assert!(verify_password("Secret123", &stored));
        assert!(!verify_password("Secret124", &stored));
        assert!(!verify_password("", &stored));
    }

    #[test]
    fn test_stored_format() {
        let stored = hash_password("Secret123").unwrap();
        let (key_hex, salt_hex) = stored.split_once('.').unwrap();
        assert_eq!(key_hex.len(), KEY_LEN * 2);
        assert_eq!(salt_hex.len(), SALT_LEN * 2);
        assert!(!stored.contains("Secret123"));
    }

    #[test]
    fn test_salt_uniqueness() {
        let first = hash_password("Secret123").unwrap();
        let second = hash_password("Secret123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("Secret123", &first));
        assert!(verify_password("Secret123", &second));
    }

    #[test]
    fn test_malformed_stored_credential_fails_closed() {
        for stored in [
            "",
            ".",
            "no-separator",
            "deadbeef.",
            ".deadbeef",
            "zz.zz",
            "deadbeef.deadbeef.deadbeef",
        ] {
            assert!(
                !verify_password("Secret123", stored),
                "expected failure for {:?}",
                stored
            );
        }
    }

    #[test]
    fn test_truncated_key_fails_before_comparison() {
        // Valid hex on both sides but a 32-byte derived key: the length
        // check rejects it without reaching the constant-time compare.
        let stored = format!("{}.{}", "ab".repeat(32), "cd".repeat(SALT_LEN));
        assert!(!verify_password("Secret123", &stored));
    }

    #[test]
    fn test_wrong_salt_length_fails() {
        let stored = format!("{}.{}", "ab".repeat(KEY_LEN), "cd".repeat(8));
        assert!(!verify_password("Secret123", &stored));
    }
}
