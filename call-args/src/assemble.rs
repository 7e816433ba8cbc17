use confidential_call_primitives::{EncryptionProvider, EncryptionWidth};
use serde_json::Value;

use crate::{
    ArgsError, EncoderConfig,
    normalize::normalize_value,
    substitute::{EncryptionFailurePolicy, Substitution, substitute},
};

/// One form field: the typed text and the width selected next to it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldInput {
    pub value: String,
    pub width: EncryptionWidth,
}

impl FieldInput {
    pub fn plain(value: impl Into<String>) -> Self {
        FieldInput {
            value: value.into(),
            width: EncryptionWidth::None,
        }
    }

    pub fn encrypted(value: impl Into<String>, width: EncryptionWidth) -> Self {
        FieldInput {
            value: value.into(),
            width,
        }
    }
}

/// Builds argument lists from form fields, encrypting through an optional
/// session.
#[derive(Clone, Copy)]
pub struct ArgumentEncoder<'p> {
    provider: Option<&'p dyn EncryptionProvider>,
    policy: EncryptionFailurePolicy,
}

impl<'p> ArgumentEncoder<'p> {
    pub fn new(provider: Option<&'p dyn EncryptionProvider>) -> Self {
        ArgumentEncoder {
            provider,
            policy: EncryptionFailurePolicy::default(),
        }
    }

    pub fn with_config(provider: Option<&'p dyn EncryptionProvider>, config: &EncoderConfig) -> Self {
        Self::new(provider).with_policy(config.failure_policy)
    }

    pub fn with_policy(mut self, policy: EncryptionFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> EncryptionFailurePolicy {
        self.policy
    }

    /// Final text for one field: substitution first, then normalization.
    pub fn encode_field(&self, index: usize, field: &FieldInput) -> Result<String, ArgsError> {
        let value = match substitute(&field.value, field.width, self.provider) {
            Substitution::Unchanged => field.value.clone(),
            Substitution::Encrypted(ct) => {
                tracing::debug!(index, width = %field.width, "encrypted argument");
                ct
            }
            Substitution::Failed(source) => match self.policy {
                EncryptionFailurePolicy::FallbackToPlaintext => {
                    tracing::warn!(
                        index,
                        width = %field.width,
                        error = %source,
                        "encryption failed, sending plaintext"
                    );
                    field.value.clone()
                }
                EncryptionFailurePolicy::Reject => {
                    return Err(ArgsError::Encryption { index, source });
                }
            },
        };
        Ok(normalize_value(&value))
    }

    /// Comma-joined argument list body, without the surrounding brackets.
    ///
    /// Returns the empty string when every field is empty, so callers can
    /// tell "no arguments" apart from `[]`.
    pub fn assemble(&self, fields: &[FieldInput]) -> Result<String, ArgsError> {
        if fields.iter().all(|f| f.value.is_empty()) {
            return Ok(String::new());
        }
        let parts = fields
            .iter()
            .enumerate()
            .map(|(i, f)| self.encode_field(i, f))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(","))
    }
}

/// Parse an assembled list body as a JSON array.
pub fn parse_argument_list(assembled: &str) -> Result<Vec<Value>, ArgsError> {
    serde_json::from_str::<Vec<Value>>(&format!("[{assembled}]"))
        .map_err(|e| ArgsError::Malformed(e.to_string()))
}
