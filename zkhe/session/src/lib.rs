//! # zkhe-session — client-side confidential session
//!
//! Client counterpart of the confidential call encoder. A [`Session`] holds
//! the network ElGamal public key for one chain and:
//!
//! - encrypts form values at a declared [`EncryptionWidth`]
//!   (it implements [`EncryptionProvider`]);
//! - generates per-contract re-encryption tokens and stores their wallet
//!   signatures;
//! - decrypts values a contract re-encrypted to a token key.
//!
//! [`LocalNetworkKey`] plays the chain's part locally: it holds the network
//! secret and re-encrypts values to a session's token key.
//!
//! [`SessionManager`] owns the session's lifecycle; callers borrow it and
//! pass it explicitly to the argument encoder.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zkhe_session::{SessionManager, request_token_signature};
//!
//! let mut sessions = SessionManager::new();
//! sessions.connect(&rpc).await?;
//!
//! let session = sessions.session_mut().unwrap();
//! let token = request_token_signature(session, contract, user, &wallet).await?;
//! ```
//!
//! ## Ciphertext Layout
//!
//! ```text
//! C(32) || D(32)        C = k·G, D = v·G + k·PK
//! ```

pub mod elgamal;
pub mod manager;
pub mod network;
pub mod session;
pub mod token;

pub use confidential_call_primitives::{
    Address, EncryptError, EncryptionProvider, EncryptionWidth,
};
pub use elgamal::{Ciphertext, Keypair};
pub use manager::{ChainClient, SessionManager, TypedDataSigner, request_token_signature};
pub use network::LocalNetworkKey;
pub use session::Session;
pub use token::{ReencryptToken, TokenSignature};

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid network public key: {0}")]
    InvalidPublicKey(&'static str),
    #[error("invalid secret key")]
    InvalidSecretKey,
    #[error("malformed ciphertext: {0}")]
    InvalidCiphertext(&'static str),
    #[error("no re-encryption keypair for contract {0}")]
    UnknownContract(Address),
    #[error("re-encryption token for contract {0} is not signed")]
    MissingSignature(Address),
    #[error("decrypted value does not fit {0}")]
    DecryptionOutOfRange(EncryptionWidth),
    #[error("session rng poisoned")]
    RngPoisoned,
    #[error(transparent)]
    Encrypt(#[from] EncryptError),
    #[error("chain request failed: {0}")]
    Chain(#[source] BoxError),
    #[error("signature request failed: {0}")]
    Signer(#[source] BoxError),
}
