// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_proto::ApduError;
use tokio::time::error::Elapsed;

use ledger_crab_apdu::{path::PathError, StatusWord};

/// Ledger Crab API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// APDU encode / decode error
    #[error("APDU error: {0:?}")]
    Apdu(ApduError),

    /// Device returned an error status
    #[error("Device error: {0}")]
    Status(StatusWord),

    /// Device returned an unrecognised status word
    #[error("Unknown status word: {0:04x}")]
    UnknownStatus(u16),

    /// Unexpected APDU response
    #[error("Unexpected APDU response")]
    UnexpectedResponse,

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// User denied operation
    #[error("Operation rejected by user")]
    UserDenied,

    /// Invalid key in response
    #[error("Invalid key object")]
    InvalidKey,

    /// Signature failed verification
    #[error("Invalid signature")]
    InvalidSignature,

    /// Invalid derivation path
    #[error("Invalid derivation path: {0}")]
    InvalidPath(PathError),

    /// Invalid BIP39 mnemonic
    #[error("Invalid mnemonic")]
    InvalidMnemonic,

    /// Transaction exceeds the chunk limit
    #[error("Transaction too long ({0} bytes)")]
    TxTooLong(usize),
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl From<ApduError> for Error {
    fn from(e: ApduError) -> Self {
        Error::Apdu(e)
    }
}

impl From<PathError> for Error {
    fn from(e: PathError) -> Self {
        Error::InvalidPath(e)
    }
}

impl From<StatusWord> for Error {
    fn from(sw: StatusWord) -> Self {
        match sw {
            StatusWord::Deny => Error::UserDenied,
            _ => Error::Status(sw),
        }
    }
}
