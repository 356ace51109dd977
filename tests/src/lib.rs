// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Tests for Crab wallet integration.
//!
//! Generic over [ledger_crab::Exchange] for reuse across the emulator
//! and TCP (speculos) targets.
//!

use bip32::{ChildNumber, XPrv};
use bip39::{Language, Mnemonic, Seed};

use ledger_crab::apdu::DerivationPath;

pub mod app_info;

pub mod public_key;

pub mod transaction;

/// Default test mnemonic (matches the speculos default seed)
pub const MNEMONIC: &str = "glory promote mansion idle axis finger extra february uncover one trip resource lawn turtle enact monster seven myth punch hobby comfort wild raise skin";

/// Derive the expected extended private key for a mnemonic and path
pub fn derive(mnemonic: &str, path: &DerivationPath) -> anyhow::Result<XPrv> {
    let m = Mnemonic::from_phrase(mnemonic, Language::English)?;
    let seed = Seed::new(&m, "");

    let mut k = XPrv::new(seed.as_bytes())?;
    for p in path.elems() {
        k = k.derive_child(ChildNumber(*p))?;
    }

    Ok(k)
}

/// Complete a pending review on an [ledger_crab::Emulator], waiting for the
/// review to be displayed
pub async fn emulator_review(e: &ledger_crab::Emulator, approve: bool) {
    for _ in 0..500 {
        if e.is_pending() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    if let Some(s) = e.screen() {
        log::debug!("review screen: {}", s);
    }

    let ok = match approve {
        true => e.approve(),
        false => e.reject(),
    };

    assert!(ok, "no review to complete");
}
