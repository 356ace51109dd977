// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing APDUs
//!
//! Transactions are streamed to the device with one or more `SIGN_TX` requests:
//!
//! - chunk `0` (P1 = 0) carries the encoded [`DerivationPath`][crate::DerivationPath]
//!   for the signing key
//! - chunks `1..N` (P1 = chunk index) carry the encoded [`Transaction`] in order
//! - every chunk but the last sets [`ChunkFlags::MORE`] in P2
//!
//! The device replies with an empty success to each intermediate chunk, and holds the
//! reply to the final chunk until the user approves or rejects the transaction on-screen.
//! On approval the reply is a [`SignTxResp`], on rejection an empty payload with
//! [`StatusWord::Deny`][crate::StatusWord::Deny].

use encdec::{DecodeOwned, Encode};

use super::{ApduError, ApduHeader, ApduStatic, Instruction, CRAB_APDU_CLA};
use crate::{chunk::ChunkFlags, helpers::prefixed};

mod transaction;
pub use transaction::{Transaction, TxProgress, MAX_COIN_LEN, MIN_TX_LEN};

/// Compact (`r || s`) signature length
pub const SIGNATURE_LEN: usize = 64;

/// Chunk index carrying the derivation path
pub const PATH_CHUNK: u8 = 0;

/// `SIGN_TX` chunk marker, used for CLA / INS and to build chunk headers
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTx;

impl ApduStatic for SignTx {
    const CLA: u8 = CRAB_APDU_CLA;
    const INS: u8 = Instruction::SignTx as u8;
}

impl SignTx {
    /// Build the header for a `SIGN_TX` chunk
    pub fn header(index: u8, more: bool) -> ApduHeader {
        let flags = match more {
            true => ChunkFlags::MORE,
            false => ChunkFlags::empty(),
        };

        ApduHeader::new(Self::INS, index, flags.bits())
    }
}

/// Transaction signature response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  SIG_LEN (64) |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                  SIGNATURE (r || s, 64 bytes)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  RECOVERY_ID  |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SignTxResp {
    /// Compact secp256k1 signature
    pub signature: [u8; SIGNATURE_LEN],
    /// Public key recovery id
    pub v: u8,
}

impl SignTxResp {
    /// Create a new [SignTxResp] APDU
    pub fn new(signature: [u8; SIGNATURE_LEN], v: u8) -> Self {
        Self { signature, v }
    }
}

impl Encode for SignTxResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + SIGNATURE_LEN + 1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = prefixed::enc(&self.signature, buff)?;
        buff[index] = self.v;
        index += 1;

        Ok(index)
    }
}

impl DecodeOwned for SignTxResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let (signature, n) = prefixed::dec::<SIGNATURE_LEN>(buff)?;

        let v = *buff.get(n).ok_or(ApduError::InvalidLength)?;

        Ok((Self { signature, v }, n + 1))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn sign_tx_resp_apdu() {
        let mut signature = [0u8; SIGNATURE_LEN];
        signature.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);

        let apdu = SignTxResp::new(signature, 1);

        let mut buff = [0u8; 128];
        let n = encode_decode_apdu(&mut buff, &apdu);
        assert_eq!(n, 66);
        assert_eq!(buff[0], 64);
        assert_eq!(buff[65], 1);
    }

    #[test]
    fn sign_tx_resp_length_prefix() {
        // Signature length other than 64 is rejected
        let mut buff = [0u8; 66];
        buff[0] = 63;
        assert!(SignTxResp::decode_owned(&buff).is_err());

        // Missing recovery byte
        buff[0] = 64;
        assert!(SignTxResp::decode_owned(&buff[..65]).is_err());
    }

    #[test]
    fn sign_tx_headers() {
        let h = SignTx::header(0, true);
        assert_eq!((h.cla, h.ins, h.p1, h.p2), (0xe0, 0x06, 0x00, 0x80));

        let h = SignTx::header(3, false);
        assert_eq!((h.p1, h.p2), (3, 0x00));
    }
}
