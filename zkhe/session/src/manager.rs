//! Session lifecycle and the wallet-signature workflow.
//!
//! The session is owned here and handed out by reference; nothing looks it up
//! through global state.

use confidential_call_primitives::Address;

use crate::{Session, SessionError, TokenSignature};

/// Minimal JSON-RPC surface needed to open a session.
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, Self::Error>;

    /// `eth_call` with empty calldata against `to`, returning raw output bytes.
    async fn call(&self, to: Address) -> Result<Vec<u8>, Self::Error>;
}

/// Wallet able to sign EIP-712 typed data (`eth_signTypedData_v4`).
#[allow(async_fn_in_trait)]
pub trait TypedDataSigner {
    type Error: std::error::Error + Send + Sync + 'static;

    /// `params = [signer, typed_data_json]`; returns the hex signature.
    async fn sign_typed_data(&self, signer: Address, typed_data_json: &str)
    -> Result<String, Self::Error>;
}

/// Owns the current [`Session`], if any, and its create/replace lifecycle.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session against `client`, replacing the current one.
    ///
    /// On failure the previous session is dropped as well, leaving no active
    /// session, and the error is returned.
    pub async fn connect<C: ChainClient>(&mut self, client: &C) -> Result<&Session, SessionError> {
        self.current = None;
        match open_session(client).await {
            Ok(session) => {
                tracing::info!(
                    chain_id = session.chain_id(),
                    "confidential session established"
                );
                Ok(&*self.current.insert(session))
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to establish confidential session");
                Err(e)
            }
        }
    }

    /// Install an already-built session, returning the one it replaces.
    pub fn replace(&mut self, session: Session) -> Option<Session> {
        self.current.replace(session)
    }

    pub fn clear(&mut self) -> Option<Session> {
        self.current.take()
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.current.as_mut()
    }
}

async fn open_session<C: ChainClient>(client: &C) -> Result<Session, SessionError> {
    let chain_id = client
        .chain_id()
        .await
        .map_err(|e| SessionError::Chain(Box::new(e)))?;
    let public_key = client
        .call(Address::NETWORK_KEY_PRECOMPILE)
        .await
        .map_err(|e| SessionError::Chain(Box::new(e)))?;
    Session::new(chain_id, &public_key)
}

/// Return the signed token for `contract`, asking `signer` only when the
/// session has none yet.
pub async fn request_token_signature<S: TypedDataSigner>(
    session: &mut Session,
    contract: Address,
    user: Address,
    signer: &S,
) -> Result<TokenSignature, SessionError> {
    if session.has_keypair(&contract) {
        if let Some(cached) = session.get_token_signature(&contract) {
            tracing::debug!(%contract, "reusing cached token signature");
            return Ok(cached);
        }
    }

    let token = session.generate_token(contract)?;
    let signature = signer
        .sign_typed_data(user, &token.typed_data_json())
        .await
        .map_err(|e| SessionError::Signer(Box::new(e)))?;
    session.set_token_signature(&contract, signature.clone())?;

    Ok(TokenSignature {
        signature,
        public_key: token.public_key,
    })
}
