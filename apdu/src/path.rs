// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP32 derivation paths
//!
//! Paths are parsed from the usual `m/44'/535348'/0'` notation and travel on the wire as a
//! component count followed by big-endian `u32` indices, with bit 31 marking hardened
//! components.
//!
//! ## Encoding
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    PATH_LEN   |           PATH[0] (u32, big-endian)           /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /               |                  PATH[N]...                   /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use core::{fmt, str::FromStr};

use byteorder::{BigEndian, ByteOrder};
use encdec::{DecodeOwned, Encode};
use heapless::Vec;

use crate::ApduError;

/// Maximum number of path components
pub const MAX_PATH_LEN: usize = 10;

/// Hardened derivation flag
pub const HARDENED: u32 = 1 << 31;

/// BIP44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// BIP44 coin type registered for the Crab coin
pub const CRAB_COIN_TYPE: u32 = 535348;

/// Path parsing errors
#[derive(Copy, Clone, PartialEq, Debug, strum::Display)]
pub enum PathError {
    /// Path contains no components
    #[strum(serialize = "empty derivation path")]
    Empty,
    /// Path exceeds [MAX_PATH_LEN] components
    #[strum(serialize = "derivation path too long")]
    TooLong,
    /// Component index does not fit in 31 bits
    #[strum(serialize = "derivation index out of range")]
    IndexRange,
    /// Path is not of the form `m/a/b'/...`
    #[strum(serialize = "malformed derivation path")]
    Syntax,
}

impl From<PathError> for ApduError {
    fn from(_: PathError) -> Self {
        ApduError::InvalidEncoding
    }
}

/// BIP32 derivation path with 1 to [MAX_PATH_LEN] components
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DerivationPath(Vec<u32, MAX_PATH_LEN>);

impl DerivationPath {
    /// Create a path from raw (already flagged) component indices
    pub fn new(elems: &[u32]) -> Result<Self, PathError> {
        if elems.is_empty() {
            return Err(PathError::Empty);
        }

        Vec::from_slice(elems)
            .map(Self)
            .map_err(|_| PathError::TooLong)
    }

    /// BIP44 account path `m/44'/535348'/account'`
    pub fn account(account: u32) -> Result<Self, PathError> {
        if account >= HARDENED {
            return Err(PathError::IndexRange);
        }

        Self::new(&[
            BIP44_PURPOSE | HARDENED,
            CRAB_COIN_TYPE | HARDENED,
            account | HARDENED,
        ])
    }

    /// Fetch raw component indices
    pub fn elems(&self) -> &[u32] {
        &self.0
    }

    /// Number of path components
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Paths are never empty, provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u32]> for DerivationPath {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');

        // Leading `m` marks the master key
        match parts.next() {
            Some("m") | Some("M") => (),
            _ => return Err(PathError::Syntax),
        }

        let mut elems = Vec::<u32, MAX_PATH_LEN>::new();

        for p in parts {
            let (digits, hardened) = match p.strip_suffix(&['\'', 'h', 'H'][..]) {
                Some(d) => (d, true),
                None => (p, false),
            };

            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(PathError::Syntax);
            }

            let index = u32::from_str(digits).map_err(|_| PathError::IndexRange)?;
            if index >= HARDENED {
                return Err(PathError::IndexRange);
            }

            let index = match hardened {
                true => index | HARDENED,
                false => index,
            };

            elems.push(index).map_err(|_| PathError::TooLong)?;
        }

        if elems.is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self(elems))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for e in self.0.iter() {
            match e & HARDENED != 0 {
                true => write!(f, "/{}'", e & !HARDENED)?,
                false => write!(f, "/{e}")?,
            }
        }
        Ok(())
    }
}

impl Encode for DerivationPath {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(1 + self.0.len() * 4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.0.len() as u8;
        for (i, e) in self.0.iter().enumerate() {
            BigEndian::write_u32(&mut buff[1 + i * 4..], *e);
        }

        Ok(n)
    }
}

impl DecodeOwned for DerivationPath {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let n = buff[0] as usize;
        if n == 0 || n > MAX_PATH_LEN {
            return Err(ApduError::InvalidEncoding);
        }
        if buff.len() < 1 + n * 4 {
            return Err(ApduError::InvalidLength);
        }

        let mut elems = Vec::new();
        for i in 0..n {
            let e = BigEndian::read_u32(&buff[1 + i * 4..]);
            // Capacity checked above
            let _ = elems.push(e);
        }

        Ok((Self(elems), 1 + n * 4))
    }
}
