// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_crab_apdu::{ApduError, StatusWord};

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Invalid argument length
    #[cfg_attr(feature = "thiserror", error("Invalid argument length"))]
    InvalidLength = 0x00,

    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x01,

    /// Chunk sequencing error (wrong index, instruction or flags)
    #[cfg_attr(feature = "thiserror", error("chunk sequencing error"))]
    Transport = 0x02,

    /// Transaction exceeds reassembly buffer
    #[cfg_attr(feature = "thiserror", error("transaction too long"))]
    TxTooLong = 0x03,

    /// Transaction decoding failed
    #[cfg_attr(feature = "thiserror", error("transaction parsing failed"))]
    Parse = 0x04,

    /// Malformed derivation path
    #[cfg_attr(feature = "thiserror", error("invalid derivation path"))]
    InvalidPath = 0x05,

    /// Invalid engine state
    #[cfg_attr(feature = "thiserror", error("invalid engine state"))]
    InvalidState = 0x06,

    /// Review already pending
    #[cfg_attr(feature = "thiserror", error("device busy"))]
    Busy = 0x07,

    /// Unsupported instruction code
    #[cfg_attr(feature = "thiserror", error("unknown instruction"))]
    UnknownInstruction = 0x08,

    /// Unsupported APDU class
    #[cfg_attr(feature = "thiserror", error("unknown class"))]
    UnknownClass = 0x09,

    /// Request rejected by the user (or timed out)
    #[cfg_attr(feature = "thiserror", error("denied by user"))]
    Deny = 0x0a,

    /// Key derivation or signing failed
    #[cfg_attr(feature = "thiserror", error("signing failed"))]
    SignFailed = 0x0b,

    /// Message encoding failed
    #[cfg_attr(feature = "thiserror", error("message encoding failed"))]
    EncodingFailed = 0x0c,
}

impl Error {
    /// Status word reported to the host for this error
    pub const fn status(&self) -> StatusWord {
        match self {
            Error::InvalidLength => StatusWord::WrongDataLength,
            Error::UnexpectedEvent | Error::InvalidState => StatusWord::BadState,
            Error::Transport => StatusWord::WrongP1P2,
            Error::TxTooLong => StatusWord::WrongTxLength,
            Error::Parse => StatusWord::TxParsingFail,
            Error::InvalidPath => StatusWord::InvalidPath,
            Error::Busy => StatusWord::Busy,
            Error::UnknownInstruction => StatusWord::InsNotSupported,
            Error::UnknownClass => StatusWord::ClaNotSupported,
            Error::Deny => StatusWord::Deny,
            Error::SignFailed => StatusWord::SignatureFail,
            Error::EncodingFailed => StatusWord::Internal,
        }
    }
}

impl From<Error> for StatusWord {
    fn from(e: Error) -> Self {
        e.status()
    }
}

impl From<ApduError> for Error {
    fn from(_: ApduError) -> Self {
        Error::EncodingFailed
    }
}
