//! Local holder of the network secret key.
//!
//! Stands in for the chain side in dev setups and tests: it decrypts values
//! encrypted under the network key and re-encrypts them to a contract's token
//! key, which is what the contract does before a user can read a value back.

use std::sync::Mutex;

use confidential_call_primitives::{
    Address, EncryptError, EncryptedValue, EncryptionWidth, PublicKeyBytes, WidthHandler,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::{
    Session, SessionError,
    elgamal::{self, Ciphertext, Keypair},
};

pub struct LocalNetworkKey {
    keypair: Keypair,
    rng: Mutex<ChaCha20Rng>,
}

impl core::fmt::Debug for LocalNetworkKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalNetworkKey")
            .field("keypair", &self.keypair)
            .finish_non_exhaustive()
    }
}

impl LocalNetworkKey {
    pub fn new(keypair: Keypair) -> Self {
        Self::with_rng_seed(keypair, rand::random())
    }

    pub fn with_rng_seed(keypair: Keypair, rng_seed: [u8; 32]) -> Self {
        LocalNetworkKey {
            keypair,
            rng: Mutex::new(ChaCha20Rng::from_seed(rng_seed)),
        }
    }

    /// Dev key derived from seed material.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::new(Keypair::from_seed(seed))
    }

    pub fn from_secret_bytes(bytes: [u8; 32]) -> Result<Self, SessionError> {
        Keypair::from_secret_bytes(bytes).map(Self::new)
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn public_bytes(&self) -> PublicKeyBytes {
        self.keypair.public_bytes()
    }

    /// Decrypt a ciphertext produced under the network key.
    pub fn decrypt(&self, width: EncryptionWidth, ciphertext: &[u8]) -> Result<u64, SessionError> {
        let ct = Ciphertext::from_bytes(ciphertext)?;
        self.keypair.decrypt(handler(width)?, &ct)
    }

    /// Re-encrypt a network ciphertext to an arbitrary target public key.
    pub fn reencrypt_to(
        &self,
        target: &PublicKeyBytes,
        width: EncryptionWidth,
        ciphertext: &[u8],
    ) -> Result<EncryptedValue, SessionError> {
        handler(width)?;
        let target = elgamal::decompress(target)
            .ok_or(SessionError::InvalidPublicKey("not a valid ristretto point"))?;
        let ct = Ciphertext::from_bytes(ciphertext)?;
        let mut rng = self.rng.lock().map_err(|_| SessionError::RngPoisoned)?;
        Ok(self.keypair.reencrypt(&ct, &target, &mut *rng).to_bytes())
    }

    /// Re-encrypt a network ciphertext to the signed token key `session`
    /// holds for `contract`, so that [`Session::decrypt`] can read it.
    pub fn reencrypt_for(
        &self,
        session: &Session,
        contract: &Address,
        width: EncryptionWidth,
        ciphertext: &[u8],
    ) -> Result<EncryptedValue, SessionError> {
        let target = session.token_public_key(contract)?;
        tracing::debug!(%contract, %width, "re-encrypting to token key");
        self.reencrypt_to(&target, width, ciphertext)
    }
}

fn handler(width: EncryptionWidth) -> Result<&'static WidthHandler, SessionError> {
    width
        .handler()
        .ok_or(SessionError::Encrypt(EncryptError::Unencrypted))
}
