// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application constants

/// Application name, returned by `GET_APP_NAME`
pub const APP_NAME: &str = "Crab";

/// Application version, returned by `GET_VERSION`
pub const APP_VERSION: (u8, u8, u8) = (
    parse_u8(env!("CARGO_PKG_VERSION_MAJOR")),
    parse_u8(env!("CARGO_PKG_VERSION_MINOR")),
    parse_u8(env!("CARGO_PKG_VERSION_PATCH")),
);

/// Platform tick rate
pub const TICKS_PER_S: u32 = 10;

/// Timeout for pending user reviews
pub const APPROVAL_TIMEOUT_S: u32 = 60;

/// Maximum encoded transaction length accepted for signing
pub const MAX_TX_LEN: usize = 1024;

/// Maximum response payload
pub const MAX_RESP_LEN: usize = 256;

const fn parse_u8(s: &str) -> u8 {
    let b = s.as_bytes();
    let mut v: u8 = 0;
    let mut i = 0;
    while i < b.len() {
        v = v * 10 + (b[i] - b'0');
        i += 1;
    }
    v
}
