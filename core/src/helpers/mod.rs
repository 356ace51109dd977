// Copyright (c) 2022-2023 The MobileCoin Foundation

use core::str::from_utf8;

use emstr::{helpers::Hex, EncodeStr};

/// Decimal places for rendering transaction values
pub const VALUE_DECIMALS: u32 = 3;

/// Format helper for values and coin symbols, `666` renders as `CRAB 0.666`
pub fn fmt_value<'a>(value: u64, coin: &str, buff: &'a mut [u8]) -> &'a str {
    let scalar = 10u64.pow(VALUE_DECIMALS);
    let (int, frac) = (value / scalar, value % scalar);

    // Write coin and integer part
    let mut n = match emstr::write!(&mut buff[..], coin, ' ', int) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    // Write zero-padded fraction, trimming trailing zeros
    if frac != 0 {
        let mut digits = [b'0'; VALUE_DECIMALS as usize];
        let mut f = frac;
        for d in digits.iter_mut().rev() {
            *d = b'0' + (f % 10) as u8;
            f /= 10;
        }

        let len = digits
            .iter()
            .rposition(|d| *d != b'0')
            .map(|i| i + 1)
            .unwrap_or(0);

        if buff.len() < n + 1 + len {
            return "ENCODE_ERR";
        }

        buff[n] = b'.';
        buff[n + 1..][..len].copy_from_slice(&digits[..len]);
        n += 1 + len;
    }

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}

/// Format helper for `0x` prefixed addresses
pub fn fmt_address<'a>(address: &[u8], buff: &'a mut [u8]) -> &'a str {
    let n = match emstr::write!(&mut buff[..], "0x", Hex(address)) {
        Ok(v) => v,
        Err(_) => return "ENCODE_ERR",
    };

    match from_utf8(&buff[..n]) {
        Ok(v) => v,
        Err(_) => "INVALID_UTF8",
    }
}
