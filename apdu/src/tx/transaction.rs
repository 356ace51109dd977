// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction wire format
//!
//! ## Encoding
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! +                        NONCE (u64 BE)                         +
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    COIN_LEN   |              COIN (ASCII, 1..=16)...          /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                                                               |
//! +                        VALUE (u64 BE)                         +
//! |                                                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                        TO (20 bytes)                          /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   MEMO_LEN (compact-size varint, 1, 3, 5 or 9 bytes)          /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! /                        MEMO (UTF-8)...                        /
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use byteorder::{BigEndian, ByteOrder};
use encdec::{Decode, Encode};

use crate::{
    helpers::varint::{self, Partial},
    public_key::ADDRESS_LEN,
    ApduError,
};

/// Maximum coin symbol length
pub const MAX_COIN_LEN: usize = 16;

/// Minimum encoded transaction length (single character coin, empty memo)
pub const MIN_TX_LEN: usize = 8 + 1 + 1 + 8 + ADDRESS_LEN + 1;

/// Transaction object, borrowing strings from the encoded buffer
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Transaction<'a> {
    /// Sender nonce
    pub nonce: u64,
    /// Coin symbol
    pub coin: &'a str,
    /// Value in base units
    pub value: u64,
    /// Recipient address
    pub to: [u8; ADDRESS_LEN],
    /// Free text memo
    pub memo: &'a str,
}

/// Progress of a partial transaction decode
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum TxProgress<'a> {
    /// More bytes are required, total length is known when `Some`
    NeedMore(Option<usize>),
    /// Transaction decoded
    Complete(Transaction<'a>),
}

impl<'a> Transaction<'a> {
    /// Create a new transaction, checking coin symbol bounds
    pub fn new(
        nonce: u64,
        coin: &'a str,
        value: u64,
        to: [u8; ADDRESS_LEN],
        memo: &'a str,
    ) -> Result<Self, ApduError> {
        check_coin(coin.as_bytes())?;

        Ok(Self {
            nonce,
            coin,
            value,
            to,
            memo,
        })
    }

    /// Parse a complete transaction, rejecting trailing bytes
    pub fn parse(buff: &'a [u8]) -> Result<Self, ApduError> {
        let (tx, n) = Self::decode(buff)?;
        if n != buff.len() {
            return Err(ApduError::InvalidLength);
        }
        Ok(tx)
    }

    /// Compute the declared encoded length from a (possibly partial) buffer
    ///
    /// Returns `Ok(None)` until enough of the header is present to read the memo length.
    /// Malformed headers fail early so the host is not asked for more data.
    pub fn declared_len(buff: &[u8]) -> Result<Option<usize>, ApduError> {
        // Nonce and coin length
        if buff.len() < 9 {
            return Ok(None);
        }

        let coin_len = buff[8] as usize;
        if coin_len == 0 || coin_len > MAX_COIN_LEN {
            return Err(ApduError::InvalidEncoding);
        }

        if buff.len() >= 9 + coin_len {
            check_coin(&buff[9..][..coin_len])?;
        }

        // Offset of memo length
        let memo_offset = 9 + coin_len + 8 + ADDRESS_LEN;
        if buff.len() <= memo_offset {
            return Ok(None);
        }

        match varint::dec_partial(&buff[memo_offset..]) {
            Partial::Need(_) => Ok(None),
            Partial::Value(v, n) => {
                let v = usize::try_from(v).map_err(|_| ApduError::InvalidLength)?;
                let total = (memo_offset + n)
                    .checked_add(v)
                    .ok_or(ApduError::InvalidLength)?;
                Ok(Some(total))
            }
        }
    }

    /// Decode a transaction from a buffer that may not yet hold all declared bytes
    pub fn decode_partial(buff: &'a [u8]) -> Result<TxProgress<'a>, ApduError> {
        match Self::declared_len(buff)? {
            Some(n) if buff.len() >= n => Self::parse(buff).map(TxProgress::Complete),
            n => Ok(TxProgress::NeedMore(n)),
        }
    }
}

fn check_coin(coin: &[u8]) -> Result<(), ApduError> {
    if coin.is_empty() || coin.len() > MAX_COIN_LEN {
        return Err(ApduError::InvalidEncoding);
    }
    if !coin.iter().all(|c| c.is_ascii_graphic()) {
        return Err(ApduError::InvalidEncoding);
    }
    Ok(())
}

impl<'a> Encode for Transaction<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        let m = self.memo.len();
        Ok(8 + 1 + self.coin.len() + 8 + ADDRESS_LEN + varint::enc_len(m as u64) + m)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        check_coin(self.coin.as_bytes())?;

        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        BigEndian::write_u64(&mut buff[index..], self.nonce);
        index += 8;

        buff[index] = self.coin.len() as u8;
        index += 1;
        buff[index..][..self.coin.len()].copy_from_slice(self.coin.as_bytes());
        index += self.coin.len();

        BigEndian::write_u64(&mut buff[index..], self.value);
        index += 8;

        buff[index..][..ADDRESS_LEN].copy_from_slice(&self.to);
        index += ADDRESS_LEN;

        index += varint::enc(self.memo.len() as u64, &mut buff[index..])?;
        buff[index..][..self.memo.len()].copy_from_slice(self.memo.as_bytes());
        index += self.memo.len();

        Ok(index)
    }
}

impl<'a> Decode<'a> for Transaction<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self::Output, usize), Self::Error> {
        if buff.len() < MIN_TX_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut index = 0;

        let nonce = BigEndian::read_u64(&buff[index..]);
        index += 8;

        let coin_len = buff[index] as usize;
        index += 1;
        if buff.len() < index + coin_len {
            return Err(ApduError::InvalidLength);
        }
        let coin = &buff[index..][..coin_len];
        check_coin(coin)?;
        // Checked ASCII above
        let coin = core::str::from_utf8(coin).map_err(|_| ApduError::InvalidUtf8)?;
        index += coin_len;

        if buff.len() < index + 8 + ADDRESS_LEN {
            return Err(ApduError::InvalidLength);
        }

        let value = BigEndian::read_u64(&buff[index..]);
        index += 8;

        let mut to = [0u8; ADDRESS_LEN];
        to.copy_from_slice(&buff[index..][..ADDRESS_LEN]);
        index += ADDRESS_LEN;

        let (memo_len, n) = varint::dec(&buff[index..])?;
        index += n;

        let memo_len = usize::try_from(memo_len).map_err(|_| ApduError::InvalidLength)?;
        if buff.len() - index < memo_len {
            return Err(ApduError::InvalidLength);
        }
        let memo = core::str::from_utf8(&buff[index..][..memo_len])
            .map_err(|_| ApduError::InvalidUtf8)?;
        index += memo_len;

        Ok((
            Self {
                nonce,
                coin,
                value,
                to,
                memo,
            },
            index,
        ))
    }
}
