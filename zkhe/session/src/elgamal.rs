//! Twisted ElGamal over Ristretto: `C = k·G`, `D = v·G + k·PK`.
//!
//! Decryption recovers `v·G` and solves the discrete log with baby-step
//! giant-step, bounded by the width the value was encrypted at.

use std::collections::HashMap;

use confidential_call_primitives::{EncryptedValue, PublicKeyBytes, WidthHandler};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::Identity,
};
use rand::RngCore;
use sha2::Sha512;

use crate::SessionError;

/// Generate a random scalar with full 256-bit entropy.
pub(crate) fn random_scalar<R: RngCore>(rng: &mut R) -> Scalar {
    let mut bytes = [0u8; 64];
    rng.fill_bytes(&mut bytes);
    Scalar::from_bytes_mod_order_wide(&bytes)
}

pub(crate) fn decompress(bytes: &[u8; 32]) -> Option<RistrettoPoint> {
    CompressedRistretto(*bytes).decompress()
}

#[allow(non_snake_case)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub C: RistrettoPoint,
    pub D: RistrettoPoint,
}

impl Ciphertext {
    pub fn to_bytes(&self) -> EncryptedValue {
        let mut out = [0u8; 64];
        out[0..32].copy_from_slice(self.C.compress().as_bytes());
        out[32..64].copy_from_slice(self.D.compress().as_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SessionError> {
        if bytes.len() != 64 {
            return Err(SessionError::InvalidCiphertext("expected 64 bytes"));
        }
        let mut c = [0u8; 32];
        let mut d = [0u8; 32];
        c.copy_from_slice(&bytes[0..32]);
        d.copy_from_slice(&bytes[32..64]);
        Ok(Ciphertext {
            C: decompress(&c).ok_or(SessionError::InvalidCiphertext("C is not a valid point"))?,
            D: decompress(&d).ok_or(SessionError::InvalidCiphertext("D is not a valid point"))?,
        })
    }
}

/// Encrypt `v` under `pk` with randomness `k`.
pub fn encrypt_with(pk: &RistrettoPoint, v: u64, k: &Scalar) -> Ciphertext {
    Ciphertext {
        C: k * G,
        D: Scalar::from(v) * G + k * pk,
    }
}

/// Encrypt `v` under a compressed public key.
pub fn encrypt<R: RngCore>(
    pk: &RistrettoPoint,
    v: u64,
    rng: &mut R,
) -> Ciphertext {
    let k = random_scalar(rng);
    encrypt_with(pk, v, &k)
}

/// Secret/public pair. Used both for the network key holder and for the
/// per-contract re-encryption keys.
#[derive(Clone)]
pub struct Keypair {
    secret: Scalar,
    public: RistrettoPoint,
}

impl core::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &hex::encode(self.public_bytes()))
            .finish_non_exhaustive()
    }
}

impl Keypair {
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        Self::from_secret(random_scalar(rng))
    }

    /// Deterministic keypair derived from arbitrary seed material.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::from_secret(Scalar::hash_from_bytes::<Sha512>(seed))
    }

    pub fn from_secret(secret: Scalar) -> Self {
        Keypair {
            public: secret * G,
            secret,
        }
    }

    pub fn from_secret_bytes(bytes: [u8; 32]) -> Result<Self, SessionError> {
        Option::<Scalar>::from(Scalar::from_canonical_bytes(bytes))
            .map(Self::from_secret)
            .ok_or(SessionError::InvalidSecretKey)
    }

    pub fn secret_bytes(&self) -> [u8; 32] {
        self.secret.to_bytes()
    }

    pub fn public(&self) -> &RistrettoPoint {
        &self.public
    }

    pub fn public_bytes(&self) -> PublicKeyBytes {
        self.public.compress().to_bytes()
    }

    /// `v·G` hidden in `ct`.
    fn unmask(&self, ct: &Ciphertext) -> RistrettoPoint {
        ct.D - self.secret * ct.C
    }

    /// Decrypt a ciphertext whose plaintext is bounded by `handler`.
    pub fn decrypt(&self, handler: &WidthHandler, ct: &Ciphertext) -> Result<u64, SessionError> {
        let m = self.unmask(ct);
        let v = discrete_log(&m, handler.ciphertext_bits)
            .ok_or(SessionError::DecryptionOutOfRange(handler.width))?;
        handler
            .check(v)
            .map_err(|_| SessionError::DecryptionOutOfRange(handler.width))?;
        Ok(v)
    }

    /// Move `ct` from this key to `target` without learning the plaintext.
    pub fn reencrypt<R: RngCore>(
        &self,
        ct: &Ciphertext,
        target: &RistrettoPoint,
        rng: &mut R,
    ) -> Ciphertext {
        let m = self.unmask(ct);
        let k = random_scalar(rng);
        Ciphertext {
            C: k * G,
            D: m + k * target,
        }
    }
}

/// Baby-step giant-step over `[0, 2^bits)`.
fn discrete_log(target: &RistrettoPoint, bits: u32) -> Option<u64> {
    let step = 1u64 << bits.div_ceil(2);

    let mut baby: HashMap<[u8; 32], u64> = HashMap::with_capacity(step as usize);
    let mut acc = RistrettoPoint::identity();
    for j in 0..step {
        baby.insert(acc.compress().to_bytes(), j);
        acc += G;
    }

    // acc == step·G
    let giant = acc;
    let mut gamma = *target;
    for i in 0..step {
        if let Some(j) = baby.get(gamma.compress().as_bytes()) {
            let v = i * step + j;
            return (v < (1u64 << bits)).then_some(v);
        }
        gamma -= giant;
    }
    None
}
