// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::ApduError;

/// Compact-size (Bitcoin style) variable length integers, used for memo lengths
pub(crate) mod varint {
    use byteorder::{ByteOrder, LittleEndian};

    use super::ApduError;

    /// Result of attempting to read a varint from a partial buffer
    #[derive(Copy, Clone, PartialEq, Debug)]
    pub enum Partial {
        /// Decoded value and encoded length
        Value(u64, usize),
        /// Buffer too short, at least this many bytes are required
        Need(usize),
    }

    pub fn enc_len(v: u64) -> usize {
        match v {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    pub fn enc(v: u64, buff: &mut [u8]) -> Result<usize, ApduError> {
        let n = enc_len(v);
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        match n {
            1 => buff[0] = v as u8,
            3 => {
                buff[0] = 0xfd;
                LittleEndian::write_u16(&mut buff[1..], v as u16);
            }
            5 => {
                buff[0] = 0xfe;
                LittleEndian::write_u32(&mut buff[1..], v as u32);
            }
            _ => {
                buff[0] = 0xff;
                LittleEndian::write_u64(&mut buff[1..], v);
            }
        }

        Ok(n)
    }

    /// Read a varint, reporting how many bytes are needed if `buff` is truncated
    pub fn dec_partial(buff: &[u8]) -> Partial {
        let n = match buff.first() {
            None => return Partial::Need(1),
            Some(0xfd) => 3,
            Some(0xfe) => 5,
            Some(0xff) => 9,
            Some(v) => return Partial::Value(*v as u64, 1),
        };

        if buff.len() < n {
            return Partial::Need(n);
        }

        let v = match n {
            3 => LittleEndian::read_u16(&buff[1..]) as u64,
            5 => LittleEndian::read_u32(&buff[1..]) as u64,
            _ => LittleEndian::read_u64(&buff[1..]),
        };

        Partial::Value(v, n)
    }

    pub fn dec(buff: &[u8]) -> Result<(u64, usize), ApduError> {
        match dec_partial(buff) {
            Partial::Value(v, n) => Ok((v, n)),
            Partial::Need(_) => Err(ApduError::InvalidLength),
        }
    }
}

/// Length-prefixed byte arrays (`[LEN][DATA; LEN]`), used for keys and signatures in responses
pub(crate) mod prefixed {
    use super::ApduError;

    pub fn enc(d: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
        if d.len() > u8::MAX as usize || buff.len() < d.len() + 1 {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = d.len() as u8;
        buff[1..][..d.len()].copy_from_slice(d);

        Ok(d.len() + 1)
    }

    /// Decode a prefixed array with an exact expected length
    pub fn dec<const N: usize>(buff: &[u8]) -> Result<([u8; N], usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }
        if buff[0] as usize != N {
            return Err(ApduError::InvalidEncoding);
        }
        if buff.len() < N + 1 {
            return Err(ApduError::InvalidLength);
        }

        let mut d = [0u8; N];
        d.copy_from_slice(&buff[1..][..N]);

        Ok((d, N + 1))
    }
}
