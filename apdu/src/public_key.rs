// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Public key APDUs, for fetching secp256k1 public keys and addresses

use encdec::{DecodeOwned, Encode};
use num_enum::TryFromPrimitive;

use super::{ApduError, ApduStatic, DerivationPath, Instruction, CRAB_APDU_CLA};
use crate::helpers::prefixed;

/// Compressed SEC1 public key length
pub const PUBLIC_KEY_LEN: usize = 33;

/// BIP32 chain code length
pub const CHAIN_CODE_LEN: usize = 32;

/// Address length (trailing bytes of the public key keccak256 digest)
pub const ADDRESS_LEN: usize = 20;

/// Public key request mode, carried in P1
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum PublicKeyMode {
    /// Return the key without user interaction
    Silent = 0x00,
    /// Display the address and wait for user confirmation
    Display = 0x01,
}

/// Public key request APDU.
///
/// Requests the public key and chain code for the provided BIP32 path, the display
/// mode is selected via P1 ([`PublicKeyMode`]).
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    PATH_LEN   |                 PATH (u32 BE)...              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct PublicKeyReq {
    /// BIP32 derivation path
    pub path: DerivationPath,
}

impl PublicKeyReq {
    /// Create a new [PublicKeyReq] APDU
    pub fn new(path: DerivationPath) -> Self {
        Self { path }
    }
}

impl ApduStatic for PublicKeyReq {
    const CLA: u8 = CRAB_APDU_CLA;
    const INS: u8 = Instruction::GetPublicKey as u8;
}

impl Encode for PublicKeyReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        self.path.encode_len()
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        self.path.encode(buff)
    }
}

impl DecodeOwned for PublicKeyReq {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let (path, n) = DerivationPath::decode_owned(buff)?;
        Ok((Self { path }, n))
    }
}

/// Public key response APDU
///
/// Contains the compressed secp256k1 public key, chain code and derived address.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  PUB_LEN (33) |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                  PUBLIC_KEY (33-byte, compressed)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  CC_LEN (32)  |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                      CHAIN_CODE (32-byte)                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        ADDRESS (20-byte)                      /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PublicKeyResp {
    /// Compressed SEC1 public key
    pub public_key: [u8; PUBLIC_KEY_LEN],
    /// BIP32 chain code
    pub chain_code: [u8; CHAIN_CODE_LEN],
    /// Address derived from the public key
    pub address: [u8; ADDRESS_LEN],
}

impl PublicKeyResp {
    /// Create a new [PublicKeyResp] APDU
    pub fn new(
        public_key: [u8; PUBLIC_KEY_LEN],
        chain_code: [u8; CHAIN_CODE_LEN],
        address: [u8; ADDRESS_LEN],
    ) -> Self {
        Self {
            public_key,
            chain_code,
            address,
        }
    }
}

impl Encode for PublicKeyResp {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + PUBLIC_KEY_LEN + 1 + CHAIN_CODE_LEN + ADDRESS_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        index += prefixed::enc(&self.public_key, &mut buff[index..])?;
        index += prefixed::enc(&self.chain_code, &mut buff[index..])?;

        buff[index..][..ADDRESS_LEN].copy_from_slice(&self.address);
        index += ADDRESS_LEN;

        Ok(index)
    }
}

impl DecodeOwned for PublicKeyResp {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        let mut index = 0;

        let (public_key, n) = prefixed::dec::<PUBLIC_KEY_LEN>(&buff[index..])?;
        index += n;

        let (chain_code, n) = prefixed::dec::<CHAIN_CODE_LEN>(&buff[index..])?;
        index += n;

        if buff.len() < index + ADDRESS_LEN {
            return Err(ApduError::InvalidLength);
        }
        let mut address = [0u8; ADDRESS_LEN];
        address.copy_from_slice(&buff[index..][..ADDRESS_LEN]);
        index += ADDRESS_LEN;

        Ok((
            Self {
                public_key,
                chain_code,
                address,
            },
            index,
        ))
    }
}
