//! Helpers that move values between a method form and the encoder.

use confidential_call_primitives::EncryptionWidth;
use serde::{Deserialize, Serialize};

use crate::{ArgsError, FieldInput};

/// Pair field texts with their selected widths. Fields without a selector
/// are sent in plaintext.
pub fn collect_fields<S: AsRef<str>>(values: &[S], widths: &[EncryptionWidth]) -> Vec<FieldInput> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| FieldInput {
            value: v.as_ref().to_owned(),
            width: widths.get(i).copied().unwrap_or_default(),
        })
        .collect()
}

/// Copy split basic-input values into the form, skipping empty ones.
pub fn fill_fields(fields: &mut [String], values: &[String]) {
    for (field, value) in fields.iter_mut().zip(values) {
        if !value.is_empty() {
            field.clone_from(value);
        }
    }
}

/// Field positions that receive a re-encryption public key and signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReencryptSlots {
    pub public_key: usize,
    pub signature: usize,
}

/// Write a signed token into the form.
pub fn fill_reencrypt_fields(
    fields: &mut [String],
    slots: ReencryptSlots,
    public_key_hex: &str,
    signature: &str,
) -> Result<(), ArgsError> {
    let len = fields.len();
    for index in [slots.public_key, slots.signature] {
        if index >= len {
            return Err(ArgsError::FieldIndex { index, len });
        }
    }
    fields[slots.public_key] = public_key_hex.to_owned();
    fields[slots.signature] = signature.to_owned();
    Ok(())
}
