// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the device
//! and is generic over [Exchange] transports

use std::{sync::Arc, time::Duration};

use encdec::{Decode, DecodeOwned, Encode};
use k256::ecdsa::{signature::hazmat::PrehashVerifier, RecoveryId, Signature, VerifyingKey};
use log::debug;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use ledger_crab_apdu::{
    prelude::*,
    tx::PATH_CHUNK,
    ApduStatic, APDU_HEADER_LEN, MAX_APDU_DATA,
};

use crate::{Error, Exchange};

/// Maximum number of transaction data chunks (P1 is a `u8`, chunk 0 carries the path)
const MAX_TX_CHUNKS: usize = u8::MAX as usize;

/// Crab handle for a connected device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports
#[derive(Clone)]
pub struct DeviceHandle<T: Exchange> {
    /// Device handle for communication
    t: Arc<Mutex<T>>,
    /// Timeout for user acknowledgements
    user_timeout_s: usize,
    /// Timeout for APDU requests
    request_timeout_s: usize,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t: Arc::new(Mutex::new(t)),
            user_timeout_s: 10,
            request_timeout_s: 2,
        }
    }
}

/// Application information
#[derive(Clone, Debug, PartialEq)]
pub struct CrabAppInfo {
    pub app_name: String,
    pub app_version: String,
}

/// Expected response for a request
#[derive(Copy, Clone, PartialEq, Debug)]
enum Wait {
    /// Response is returned immediately
    Request,
    /// Response is deferred pending user interaction
    User,
}

impl<T: Exchange + Send> DeviceHandle<T> {
    /// Set the timeout for user interactions
    pub fn with_user_timeout(mut self, seconds: usize) -> Self {
        self.user_timeout_s = seconds;
        self
    }

    /// Set the timeout for APDU requests
    pub fn with_request_timeout(mut self, seconds: usize) -> Self {
        self.request_timeout_s = seconds;
        self
    }

    /// Helper to fetch user interaction timeout
    fn user_timeout(&self) -> Duration {
        Duration::from_secs(self.user_timeout_s as u64)
    }

    /// Helper to fetch APDU request timeout
    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s as u64)
    }

    /// Fetch ledger application info
    pub async fn app_info(&self) -> Result<CrabAppInfo, Error> {
        let app_version = self.app_version().await?;
        let app_name = self.app_name().await?;

        Ok(CrabAppInfo {
            app_name,
            app_version: app_version.to_string(),
        })
    }

    /// Fetch application version
    pub async fn app_version(&self) -> Result<VersionResp, Error> {
        debug!("Requesting app version");

        let h = ApduHeader::new(VersionReq::INS, 0, 0);
        let resp = self.request(h, &[], Wait::Request).await?;

        let (v, _) = VersionResp::decode(&resp)?;
        Ok(v)
    }

    /// Fetch application name
    pub async fn app_name(&self) -> Result<String, Error> {
        debug!("Requesting app name");

        let h = ApduHeader::new(AppNameReq::INS, 0, 0);
        let resp = self.request(h, &[], Wait::Request).await?;

        let (n, _) = AppNameResp::decode(&resp)?;
        Ok(n.name.to_string())
    }

    /// Fetch the public key, chain code and address for the provided path,
    /// optionally displaying the address for user confirmation
    pub async fn public_key(
        &self,
        path: &DerivationPath,
        display: bool,
    ) -> Result<PublicKeyResp, Error> {
        debug!("Requesting public key for path: {} (display: {})", path, display);

        let (mode, wait) = match display {
            true => (PublicKeyMode::Display, Wait::User),
            false => (PublicKeyMode::Silent, Wait::Request),
        };

        let req = PublicKeyReq::new(path.clone());
        let mut buff = [0u8; MAX_APDU_DATA];
        let n = req.encode(&mut buff)?;

        let h = ApduHeader::new(PublicKeyReq::INS, mode as u8, 0);
        let resp = self.request(h, &buff[..n], wait).await?;

        let (k, _) = PublicKeyResp::decode_owned(&resp)?;

        VerifyingKey::from_sec1_bytes(&k.public_key).map_err(|_| Error::InvalidKey)?;

        Ok(k)
    }

    /// Sign an encoded transaction with the key for the provided path
    ///
    /// The transaction is sent in chunks, the final chunk awaits user approval
    /// on the device.
    pub async fn sign_tx(&self, path: &DerivationPath, tx: &[u8]) -> Result<SignTxResp, Error> {
        let chunks = Chunks::new(tx);
        if chunks.count_chunks() > MAX_TX_CHUNKS {
            return Err(Error::TxTooLong(tx.len()));
        }

        debug!("Signing transaction ({} bytes) with path: {}", tx.len(), path);

        // Hold the transport for the whole sequence
        let mut t = self.t.lock().await;

        // Chunk 0 carries the derivation path
        let mut buff = [0u8; MAX_APDU_DATA];
        let n = path.encode(&mut buff)?;

        let resp = exchange(
            &mut *t,
            SignTx::header(PATH_CHUNK, true),
            &buff[..n],
            self.request_timeout(),
        )
        .await?;
        check_empty(&resp)?;

        // Chunks 1..N carry the transaction
        for c in chunks {
            let h = SignTx::header(c.index as u8 + 1, c.more);

            debug!("Sending chunk {} ({} bytes, more: {})", c.index + 1, c.data.len(), c.more);

            if c.more {
                let resp = exchange(&mut *t, h, c.data, self.request_timeout()).await?;
                check_empty(&resp)?;
                continue;
            }

            debug!("Waiting for user approval");

            let resp = exchange(&mut *t, h, c.data, self.user_timeout())
                .await
                .map_err(user_timeout)?;

            let (sig, _) = SignTxResp::decode_owned(&resp)?;
            return Ok(sig);
        }

        Err(Error::UnexpectedResponse)
    }

    /// Issue a single request, returning the response payload
    async fn request(&self, header: ApduHeader, data: &[u8], wait: Wait) -> Result<Vec<u8>, Error> {
        let mut t = self.t.lock().await;

        match wait {
            Wait::Request => exchange(&mut *t, header, data, self.request_timeout()).await,
            Wait::User => exchange(&mut *t, header, data, self.user_timeout())
                .await
                .map_err(user_timeout),
        }
    }
}

/// Build and exchange a request frame, splitting the response status word
async fn exchange<T: Exchange + Send>(
    t: &mut T,
    header: ApduHeader,
    data: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, Error> {
    let mut req = vec![0u8; APDU_HEADER_LEN + data.len()];
    header.write(data.len(), &mut req)?;
    req[APDU_HEADER_LEN..].copy_from_slice(data);

    let resp = t.exchange(&req, timeout).await?;

    let (payload, status) = StatusWord::split(&resp).ok_or(Error::UnexpectedResponse)?;

    match status {
        Ok(StatusWord::Ok) => Ok(payload.to_vec()),
        Ok(sw) => Err(Error::from(sw)),
        Err(code) => Err(Error::UnknownStatus(code)),
    }
}

fn check_empty(resp: &[u8]) -> Result<(), Error> {
    match resp.is_empty() {
        true => Ok(()),
        false => Err(Error::UnexpectedResponse),
    }
}

fn user_timeout(e: Error) -> Error {
    match e {
        Error::RequestTimeout => Error::UserTimeout,
        _ => e,
    }
}

/// Verify a transaction signature against the signer's compressed public key,
/// checking the recovery id resolves to the same key
pub fn verify_signature(public_key: &[u8], tx: &[u8], sig: &SignTxResp) -> Result<(), Error> {
    let vk = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| Error::InvalidKey)?;

    let s = Signature::from_slice(&sig.signature).map_err(|_| Error::InvalidSignature)?;

    let digest = Sha256::digest(tx);

    vk.verify_prehash(&digest, &s).map_err(|_| Error::InvalidSignature)?;

    let recid = RecoveryId::from_byte(sig.v).ok_or(Error::InvalidSignature)?;
    let recovered = VerifyingKey::recover_from_prehash(&digest, &s, recid)
        .map_err(|_| Error::InvalidSignature)?;

    match recovered == vk {
        true => Ok(()),
        false => Err(Error::InvalidSignature),
    }
}

/// Encode a compact transaction signature in ASN.1 DER form
pub fn signature_der(sig: &SignTxResp) -> Result<Vec<u8>, Error> {
    let s = Signature::from_slice(&sig.signature).map_err(|_| Error::InvalidSignature)?;

    Ok(s.to_der().as_bytes().to_vec())
}
