//! Confidential substitution: swap a field's plaintext for ciphertext hex.

use confidential_call_primitives::{
    EncryptError, EncryptionProvider, EncryptionWidth, to_hex_string,
};
use serde::{Deserialize, Serialize};

/// What to do when a field marked for encryption cannot be encrypted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EncryptionFailurePolicy {
    /// Send the field's plaintext and log a warning.
    #[default]
    FallbackToPlaintext,
    /// Abort the assembly with an error naming the field.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Value passes through untouched.
    Unchanged,
    /// `0x`-prefixed lowercase ciphertext hex.
    Encrypted(String),
    Failed(EncryptError),
}

/// Decide whether `raw` is replaced by ciphertext.
///
/// Nothing happens for unencrypted widths, a missing provider, empty values,
/// or values already starting with `0x`.
pub fn substitute(
    raw: &str,
    width: EncryptionWidth,
    provider: Option<&dyn EncryptionProvider>,
) -> Substitution {
    let Some(provider) = provider else {
        return Substitution::Unchanged;
    };
    if !width.is_encrypted() || raw.is_empty() || raw.starts_with("0x") {
        return Substitution::Unchanged;
    }

    match width
        .parse_plaintext(raw)
        .and_then(|value| provider.encrypt(width, value))
    {
        Ok(ct) => Substitution::Encrypted(to_hex_string(&ct)),
        Err(e) => Substitution::Failed(e),
    }
}
