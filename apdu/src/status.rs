// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Response status words
//!
//! Every response frame ends with a big-endian status word, `0x9000` on success.

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

/// Status words returned by the Crab application
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Debug,
    EnumString,
    Display,
    EnumVariantNames,
    EnumIter,
    TryFromPrimitive,
)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    Ok = 0x9000,

    /// Operation refused by the user
    Deny = 0x6985,

    /// Incorrect P1 or P2, including chunk sequencing errors
    WrongP1P2 = 0x6a86,

    /// Incorrect data length
    WrongDataLength = 0x6a87,

    /// Instruction not supported
    InsNotSupported = 0x6d00,

    /// Class not supported
    ClaNotSupported = 0x6e00,

    /// Unclassified internal failure
    Internal = 0x6f00,

    /// Derivation path malformed or too long
    InvalidPath = 0xb001,

    /// Transaction exceeds the reassembly buffer
    WrongTxLength = 0xb004,

    /// Transaction could not be parsed
    TxParsingFail = 0xb005,

    /// Request not valid in the current state
    BadState = 0xb007,

    /// Signature generation failed
    SignatureFail = 0xb008,

    /// A user review is already pending
    Busy = 0xb009,
}

impl StatusWord {
    /// Fetch raw status word
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Encode status word (big-endian) to the provided buffer
    pub fn encode(&self, buff: &mut [u8]) -> usize {
        buff[..2].copy_from_slice(&self.code().to_be_bytes());
        2
    }

    /// Split a raw response into payload and status word
    ///
    /// Returns `None` if the response is too short, unknown status words are
    /// returned as `Err(code)`
    pub fn split(resp: &[u8]) -> Option<(&[u8], Result<StatusWord, u16>)> {
        if resp.len() < 2 {
            return None;
        }

        let (data, sw) = resp.split_at(resp.len() - 2);
        let sw = u16::from_be_bytes([sw[0], sw[1]]);

        Some((data, StatusWord::try_from(sw).map_err(|_| sw)))
    }
}

impl From<StatusWord> for u16 {
    fn from(s: StatusWord) -> Self {
        s as u16
    }
}
