// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Crab app communication
//!
//! This module provides a protocol specification and reference implementation for communication
//! with Crab hardware wallets.
//!
//! Requests are ISO7816-style APDUs: a four byte [`ApduHeader`] (`CLA INS P1 P2`), a single
//! length byte and up to [`MAX_APDU_DATA`] bytes of payload. Responses carry the payload followed
//! by a two byte [`StatusWord`].
//!
//! Unlike the packed little-endian encodings common to embedded protocols, all multi-byte
//! integers on this wire are big-endian, matching the host tooling this app is driven by.
//! The only exception is the compact-size length prefix on memos, which follows the
//! Bitcoin varint convention.
//!
//! Payloads larger than one frame (transactions with long memos) are split by the host
//! using [`chunk::Chunks`] and reassembled on the device, see [`tx`] for the `SIGN_TX`
//! chunk numbering.

#![no_std]

pub use ledger_proto::{ApduError, ApduStatic};

pub mod app_info;
pub mod chunk;
pub mod path;
pub mod prelude;
pub mod public_key;
pub mod status;
pub mod tx;

mod helpers;

pub use path::DerivationPath;
pub use status::StatusWord;

/// Crab APDU Class
pub const CRAB_APDU_CLA: u8 = 0xe0;

/// Maximum payload carried by a single APDU frame
pub const MAX_APDU_DATA: usize = 255;

/// Length of the APDU header plus `Lc` byte
pub const APDU_HEADER_LEN: usize = 5;

/// Crab APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x03,

    /// Fetch application name
    GetAppName = 0x04,

    /// Fetch a public key (and optionally display the address for confirmation)
    GetPublicKey = 0x05,

    /// Sign a transaction, data is streamed over one or more chunks
    SignTx = 0x06,
}

/// APDU header, prefixing every request frame
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      CLA      |      INS      |      P1       |      P2       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      LC       |                  DATA...                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ApduHeader {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
}

impl ApduHeader {
    /// Create a new header for the Crab class
    pub const fn new(ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla: CRAB_APDU_CLA,
            ins,
            p1,
            p2,
        }
    }

    /// Split a raw request frame into header and payload
    pub fn parse(buff: &[u8]) -> Result<(Self, &[u8]), ApduError> {
        if buff.len() < APDU_HEADER_LEN {
            return Err(ApduError::InvalidLength);
        }

        let h = Self {
            cla: buff[0],
            ins: buff[1],
            p1: buff[2],
            p2: buff[3],
        };

        // Lc must match the remaining payload exactly
        let lc = buff[4] as usize;
        let data = &buff[APDU_HEADER_LEN..];
        if data.len() != lc {
            return Err(ApduError::InvalidLength);
        }

        Ok((h, data))
    }

    /// Write header and `Lc` for a payload of `data_len` bytes
    pub fn write(&self, data_len: usize, buff: &mut [u8]) -> Result<usize, ApduError> {
        if data_len > MAX_APDU_DATA || buff.len() < APDU_HEADER_LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.cla;
        buff[1] = self.ins;
        buff[2] = self.p1;
        buff[3] = self.p2;
        buff[4] = data_len as u8;

        Ok(APDU_HEADER_LEN)
    }
}
