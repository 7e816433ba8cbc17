//! Types and traits for confidential contract-call crates
//!
//! The argument encoder only ever sees an [`EncryptionProvider`]; the session
//! that implements it lives in `zkhe-session`.


use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// ZK El Gamal ciphertext
/// bytes 0..32 = randomness commitment `k·G`
/// bytes 32..64 = masked value `v·G + k·PK`
pub type EncryptedValue = [u8; 64];

/// Compressed Ristretto public key bytes.
pub type PublicKeyBytes = [u8; 32];

/// Bit width a form field is encrypted at.
///
/// Selector tags are parsed with [`FromStr`]: `""`/`"none"`, `"1"`/`"bool"`,
/// `"8"`, `"16"`, `"32"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EncryptionWidth {
    #[default]
    None,
    Bool,
    U8,
    U16,
    U32,
}

/// Typed handler for one encrypted width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WidthHandler {
    pub width: EncryptionWidth,
    /// Selector tag as rendered in the form.
    pub tag: &'static str,
    /// Bits of the ciphertext the value is encrypted into.
    pub ciphertext_bits: u32,
    /// Largest plaintext accepted.
    pub max_value: u64,
}

/// Lookup table from width to handler. `EncryptionWidth::None` has no entry.
pub static WIDTH_HANDLERS: [WidthHandler; 4] = [
    // booleans share the 8-bit ciphertext
    WidthHandler {
        width: EncryptionWidth::Bool,
        tag: "1",
        ciphertext_bits: 8,
        max_value: 1,
    },
    WidthHandler {
        width: EncryptionWidth::U8,
        tag: "8",
        ciphertext_bits: 8,
        max_value: u8::MAX as u64,
    },
    WidthHandler {
        width: EncryptionWidth::U16,
        tag: "16",
        ciphertext_bits: 16,
        max_value: u16::MAX as u64,
    },
    WidthHandler {
        width: EncryptionWidth::U32,
        tag: "32",
        ciphertext_bits: 32,
        max_value: u32::MAX as u64,
    },
];

impl EncryptionWidth {
    /// Handler for this width, `None` when the field is sent in plaintext.
    pub fn handler(self) -> Option<&'static WidthHandler> {
        WIDTH_HANDLERS.iter().find(|h| h.width == self)
    }

    pub fn is_encrypted(self) -> bool {
        self != EncryptionWidth::None
    }

    /// Parse a field's text into the integer that gets encrypted.
    ///
    /// Surrounding whitespace is ignored; `true`/`false` are accepted for
    /// [`EncryptionWidth::Bool`].
    pub fn parse_plaintext(self, raw: &str) -> Result<u64, EncryptError> {
        let handler = self.handler().ok_or(EncryptError::Unencrypted)?;
        let trimmed = raw.trim();
        let value = match (self, trimmed) {
            (EncryptionWidth::Bool, "true") => 1,
            (EncryptionWidth::Bool, "false") => 0,
            _ => trimmed
                .parse::<u64>()
                .map_err(|_| EncryptError::NotNumeric(raw.to_string()))?,
        };
        handler.check(value)?;
        Ok(value)
    }
}

impl WidthHandler {
    pub fn check(&self, value: u64) -> Result<(), EncryptError> {
        if value > self.max_value {
            return Err(EncryptError::OutOfRange {
                value,
                width: self.width,
            });
        }
        Ok(())
    }
}

impl FromStr for EncryptionWidth {
    type Err = EncryptError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim() {
            "" | "none" => Ok(EncryptionWidth::None),
            "bool" => Ok(EncryptionWidth::Bool),
            other => WIDTH_HANDLERS
                .iter()
                .find(|h| h.tag == other)
                .map(|h| h.width)
                .ok_or_else(|| EncryptError::UnknownWidth(other.to_string())),
        }
    }
}

impl fmt::Display for EncryptionWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionWidth::None => f.write_str("none"),
            EncryptionWidth::Bool => f.write_str("bool"),
            EncryptionWidth::U8 => f.write_str("euint8"),
            EncryptionWidth::U16 => f.write_str("euint16"),
            EncryptionWidth::U32 => f.write_str("euint32"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncryptError {
    #[error("field is not encrypted")]
    Unencrypted,
    #[error("unknown encryption width tag `{0}`")]
    UnknownWidth(String),
    #[error("value `{0}` is not an unsigned integer")]
    NotNumeric(String),
    #[error("value {value} does not fit {width}")]
    OutOfRange { value: u64, width: EncryptionWidth },
    #[error("encryption backend failed: {0}")]
    Backend(String),
}

/// Capability that turns a plaintext integer into ciphertext bytes.
///
/// Implementations are read-only from the caller's point of view; the argument
/// encoder borrows one for the duration of a single assembly.
pub trait EncryptionProvider {
    fn encrypt(&self, width: EncryptionWidth, value: u64) -> Result<Vec<u8>, EncryptError>;
}

impl<T: EncryptionProvider + ?Sized> EncryptionProvider for &T {
    fn encrypt(&self, width: EncryptionWidth, value: u64) -> Result<Vec<u8>, EncryptError> {
        (**self).encrypt(width, value)
    }
}

/// Lowercase hex with a `0x` prefix.
pub fn to_hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode hex with an optional `0x`/`0X` prefix.
pub fn from_hex_string(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let s = s.trim();
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(body)
}

/// 20-byte account or contract address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct Address(pub [u8; 20]);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address is not valid hex")]
    InvalidHex,
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl Address {
    /// Address of the precompile that serves the network FHE public key.
    pub const NETWORK_KEY_PRECOMPILE: Address = Address([
        0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x44,
    ]);

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !(s.starts_with("0x") || s.starts_with("0X")) {
            return Err(AddressError::MissingPrefix);
        }
        let bytes = from_hex_string(s).map_err(|_| AddressError::InvalidHex)?;
        let raw: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Address(raw))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex_string(&self.0))
    }
}
