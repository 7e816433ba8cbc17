//! # confidential-call-args — contract form arguments to JSON
//!
//! Turns the raw text of a method form into the JSON argument list handed to
//! an ABI encoder. Fields marked with an [`EncryptionWidth`] are replaced by
//! ciphertext from an [`EncryptionProvider`] first.
//!
//! ## Pipeline
//!
//! ```text
//! (raw, width) --substitute--> raw | 0x<ciphertext> --normalize--> JSON text
//!   ... joined with "," ; all fields empty -> ""
//! ```
//!
//! ```rust,ignore
//! use confidential_call_args::{ArgumentEncoder, FieldInput, parse_argument_list};
//!
//! let fields = [FieldInput::plain("42"), FieldInput::encrypted("7", EncryptionWidth::U8)];
//! let body = ArgumentEncoder::new(Some(&session)).assemble(&fields)?;
//! let args = parse_argument_list(&body)?;
//! ```

pub mod assemble;
pub mod config;
pub mod encode;
pub mod form;
pub mod normalize;
pub mod split;
pub mod substitute;
#[cfg(test)]
mod tests;

pub use assemble::{ArgumentEncoder, FieldInput, parse_argument_list};
pub use config::{ConfigError, EncoderConfig};
pub use confidential_call_primitives::{EncryptError, EncryptionProvider, EncryptionWidth};
pub use encode::{AbiEncoder, FunctionKind, FunctionSpec, Param, encoded_call, encoded_params};
pub use form::{ReencryptSlots, collect_fields, fill_fields, fill_reencrypt_fields};
pub use normalize::normalize_value;
pub use split::split_basic_input;
pub use substitute::{EncryptionFailurePolicy, Substitution, substitute};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error("malformed argument list: {0}")]
    Malformed(String),
    #[error("cannot encode empty arguments")]
    EmptyArguments,
    #[error("cannot encrypt argument {index}: {source}")]
    Encryption {
        index: usize,
        #[source]
        source: EncryptError,
    },
    #[error("form has no field {index} (it has {len})")]
    FieldIndex { index: usize, len: usize },
    #[error("abi encoding failed: {0}")]
    Abi(String),
}
