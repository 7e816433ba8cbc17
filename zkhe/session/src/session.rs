use std::collections::HashMap;
use std::sync::Mutex;

use confidential_call_primitives::{
    Address, EncryptError, EncryptedValue, EncryptionProvider, EncryptionWidth, PublicKeyBytes,
};
use curve25519_dalek::ristretto::RistrettoPoint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::{
    SessionError,
    elgamal::{self, Ciphertext, Keypair},
    token::{ReencryptToken, TokenSignature},
};

struct ContractToken {
    keypair: Keypair,
    signature: Option<String>,
}

/// Active confidential-computation instance for one chain.
///
/// Encrypts under the network public key and keeps one re-encryption keypair
/// per verifying contract.
pub struct Session {
    chain_id: u64,
    network_pk: RistrettoPoint,
    network_pk_bytes: PublicKeyBytes,
    rng: Mutex<ChaCha20Rng>,
    tokens: HashMap<Address, ContractToken>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("chain_id", &self.chain_id)
            .field("network_pk", &hex::encode(self.network_pk_bytes))
            .field("contracts", &self.tokens.len())
            .finish()
    }
}

impl Session {
    pub fn new(chain_id: u64, network_public_key: &[u8]) -> Result<Self, SessionError> {
        Self::with_seed(chain_id, network_public_key, rand::random())
    }

    /// Session with a deterministic RNG (tests, reproducible fixtures).
    pub fn with_seed(
        chain_id: u64,
        network_public_key: &[u8],
        rng_seed: [u8; 32],
    ) -> Result<Self, SessionError> {
        let network_pk_bytes: PublicKeyBytes = network_public_key
            .try_into()
            .map_err(|_| SessionError::InvalidPublicKey("expected 32 bytes"))?;
        let network_pk = elgamal::decompress(&network_pk_bytes)
            .ok_or(SessionError::InvalidPublicKey("not a valid ristretto point"))?;
        Ok(Session {
            chain_id,
            network_pk,
            network_pk_bytes,
            rng: Mutex::new(ChaCha20Rng::from_seed(rng_seed)),
            tokens: HashMap::new(),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn network_public_key(&self) -> &PublicKeyBytes {
        &self.network_pk_bytes
    }

    fn encrypt_value(&self, width: EncryptionWidth, value: u64) -> Result<EncryptedValue, EncryptError> {
        let handler = width.handler().ok_or(EncryptError::Unencrypted)?;
        handler.check(value)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EncryptError::Backend("session rng poisoned".into()))?;
        Ok(elgamal::encrypt(&self.network_pk, value, &mut *rng).to_bytes())
    }

    pub fn encrypt_bool(&self, value: bool) -> Result<EncryptedValue, EncryptError> {
        self.encrypt_value(EncryptionWidth::Bool, value as u64)
    }

    pub fn encrypt8(&self, value: u8) -> Result<EncryptedValue, EncryptError> {
        self.encrypt_value(EncryptionWidth::U8, value.into())
    }

    pub fn encrypt16(&self, value: u16) -> Result<EncryptedValue, EncryptError> {
        self.encrypt_value(EncryptionWidth::U16, value.into())
    }

    pub fn encrypt32(&self, value: u32) -> Result<EncryptedValue, EncryptError> {
        self.encrypt_value(EncryptionWidth::U32, value.into())
    }

    /// Create a fresh re-encryption keypair for `verifying_contract`.
    ///
    /// Any previous keypair and signature for that contract are dropped.
    pub fn generate_token(&mut self, verifying_contract: Address) -> Result<ReencryptToken, SessionError> {
        let keypair = {
            let mut rng = self.rng.lock().map_err(|_| SessionError::RngPoisoned)?;
            Keypair::generate(&mut *rng)
        };
        let token = ReencryptToken::new(self.chain_id, verifying_contract, keypair.public_bytes());
        self.tokens.insert(
            verifying_contract,
            ContractToken {
                keypair,
                signature: None,
            },
        );
        tracing::debug!(contract = %verifying_contract, "generated re-encryption token");
        Ok(token)
    }

    /// True once a keypair exists for `contract` and its token has been signed.
    pub fn has_keypair(&self, contract: &Address) -> bool {
        self.tokens
            .get(contract)
            .is_some_and(|t| t.signature.is_some())
    }

    pub fn set_token_signature(
        &mut self,
        contract: &Address,
        signature: impl Into<String>,
    ) -> Result<(), SessionError> {
        let entry = self
            .tokens
            .get_mut(contract)
            .ok_or(SessionError::UnknownContract(*contract))?;
        entry.signature = Some(signature.into());
        Ok(())
    }

    pub fn get_token_signature(&self, contract: &Address) -> Option<TokenSignature> {
        let entry = self.tokens.get(contract)?;
        Some(TokenSignature {
            signature: entry.signature.clone()?,
            public_key: entry.keypair.public_bytes(),
        })
    }

    fn signed_token(&self, contract: &Address) -> Result<&ContractToken, SessionError> {
        let entry = self
            .tokens
            .get(contract)
            .ok_or(SessionError::UnknownContract(*contract))?;
        if entry.signature.is_none() {
            return Err(SessionError::MissingSignature(*contract));
        }
        Ok(entry)
    }

    /// Public key of the signed token for `contract`, the target values are
    /// re-encrypted to.
    pub fn token_public_key(&self, contract: &Address) -> Result<PublicKeyBytes, SessionError> {
        self.signed_token(contract).map(|t| t.keypair.public_bytes())
    }

    /// Decrypt a value the contract re-encrypted to this session's token key.
    pub fn decrypt(
        &self,
        contract: &Address,
        width: EncryptionWidth,
        ciphertext: &[u8],
    ) -> Result<u64, SessionError> {
        let handler = width
            .handler()
            .ok_or(SessionError::Encrypt(EncryptError::Unencrypted))?;
        let entry = self.signed_token(contract)?;
        let ct = Ciphertext::from_bytes(ciphertext)?;
        entry.keypair.decrypt(handler, &ct)
    }
}

impl EncryptionProvider for Session {
    fn encrypt(&self, width: EncryptionWidth, value: u64) -> Result<Vec<u8>, EncryptError> {
        self.encrypt_value(width, value).map(|ct| ct.to_vec())
    }
}
