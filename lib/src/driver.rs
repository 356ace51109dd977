// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Seed-backed [Driver] for the emulated device

use bip32::{ChildNumber, XPrv};
use bip39::{Language, Mnemonic, Seed};
use zeroize::Zeroize;

use ledger_crab_core::engine::{Driver, Error as EngineError, ExtendedKey};

use crate::Error;

/// BIP39 seed length
pub const SEED_LEN: usize = 64;

/// [Driver] implementation deriving keys from a BIP39 seed held in memory
pub struct SeedDriver {
    seed: [u8; SEED_LEN],
}

impl SeedDriver {
    /// Create a driver from a raw seed
    pub fn new(seed: [u8; SEED_LEN]) -> Self {
        Self { seed }
    }

    /// Create a driver from a BIP39 mnemonic phrase (with an empty passphrase)
    pub fn from_mnemonic(phrase: &str) -> Result<Self, Error> {
        let mnemonic =
            Mnemonic::from_phrase(phrase, Language::English).map_err(|_| Error::InvalidMnemonic)?;

        let seed = Seed::new(&mnemonic, "");

        let mut s = [0u8; SEED_LEN];
        s.copy_from_slice(seed.as_bytes());

        Ok(Self::new(s))
    }
}

impl Driver for SeedDriver {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> Result<ExtendedKey, EngineError> {
        let mut k = XPrv::new(self.seed).map_err(|_| EngineError::InvalidPath)?;

        for p in path {
            k = k
                .derive_child(ChildNumber(*p))
                .map_err(|_| EngineError::InvalidPath)?;
        }

        Ok(ExtendedKey::new(k.to_bytes(), k.attrs().chain_code))
    }
}

impl Drop for SeedDriver {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}
