// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::str::FromStr;

use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use ledger_crab::{apdu::DerivationPath, Emulator};
use ledger_crab_core::review::Button;

#[derive(Clone, PartialEq, Debug)]
pub struct HexData<const N: usize = 32>(pub [u8; N]);

impl<const N: usize> std::str::FromStr for HexData<N> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut b = [0u8; N];

        hex::decode_to_slice(s, &mut b)?;

        Ok(HexData(b))
    }
}

impl<const N: usize> AsRef<[u8; N]> for HexData<N> {
    fn as_ref(&self) -> &[u8; N] {
        &self.0
    }
}

impl<const N: usize> std::fmt::Display for HexData<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Parse a BIP32 derivation path (`m/44'/535348'/0'`)
pub fn parse_path(s: &str) -> Result<DerivationPath, String> {
    DerivationPath::from_str(s).map_err(|e| e.to_string())
}

/// Drive emulator buttons from stdin (`left`, `right`, `both`, one per line)
pub fn spawn_buttons(e: Emulator) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(l)) = lines.next_line().await {
            let b = match Button::from_str(l.trim()) {
                Ok(b) => b,
                Err(_) => {
                    warn!("unrecognised button '{}' (expected left, right or both)", l.trim());
                    continue;
                }
            };

            e.press(b);

            if let Some(s) = e.screen() {
                info!("screen:\n{}", s);
            }
        }
    });
}
