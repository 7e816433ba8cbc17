//! Re-encryption authorization tokens.
//!
//! A token binds a freshly generated public key to one verifying contract.
//! The user signs it as EIP-712 typed data; the contract then re-encrypts
//! values to that key so the session can decrypt them locally.

use confidential_call_primitives::{Address, PublicKeyBytes, to_hex_string};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const TOKEN_DOMAIN_NAME: &str = "Authorization token";
pub const TOKEN_DOMAIN_VERSION: &str = "1";
pub const TOKEN_PRIMARY_TYPE: &str = "Reencrypt";

/// Output of [`crate::Session::generate_token`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReencryptToken {
    pub public_key: PublicKeyBytes,
    /// EIP-712 typed data to be signed by the user.
    pub typed_data: Value,
}

impl ReencryptToken {
    pub(crate) fn new(chain_id: u64, verifying_contract: Address, public_key: PublicKeyBytes) -> Self {
        let typed_data = json!({
            "types": {
                "EIP712Domain": [
                    { "name": "name", "type": "string" },
                    { "name": "version", "type": "string" },
                    { "name": "chainId", "type": "uint256" },
                    { "name": "verifyingContract", "type": "address" },
                ],
                TOKEN_PRIMARY_TYPE: [
                    { "name": "publicKey", "type": "bytes32" },
                ],
            },
            "primaryType": TOKEN_PRIMARY_TYPE,
            "domain": {
                "name": TOKEN_DOMAIN_NAME,
                "version": TOKEN_DOMAIN_VERSION,
                "chainId": chain_id,
                "verifyingContract": verifying_contract.to_string(),
            },
            "message": {
                "publicKey": to_hex_string(&public_key),
            },
        });
        ReencryptToken {
            public_key,
            typed_data,
        }
    }

    /// Typed data as the JSON string wallets expect in `eth_signTypedData_v4`.
    pub fn typed_data_json(&self) -> String {
        self.typed_data.to_string()
    }
}

/// Signed token ready to be attached to a re-encryption request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSignature {
    pub signature: String,
    #[serde(with = "hex_key")]
    pub public_key: PublicKeyBytes,
}

impl TokenSignature {
    pub fn public_key_hex(&self) -> String {
        to_hex_string(&self.public_key)
    }
}

mod hex_key {
    use confidential_call_primitives::{PublicKeyBytes, from_hex_string, to_hex_string};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(key: &PublicKeyBytes, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&to_hex_string(key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<PublicKeyBytes, D::Error> {
        let s = String::deserialize(d)?;
        let bytes = from_hex_string(&s).map_err(D::Error::custom)?;
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| D::Error::custom("public key must be 32 bytes"))
    }
}
