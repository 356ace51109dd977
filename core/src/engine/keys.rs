// Copyright (c) 2022-2023 The MobileCoin Foundation

//! secp256k1 key derivation and signing

use k256::ecdsa::SigningKey;
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use zeroize::Zeroize;

use ledger_crab_apdu::{
    public_key::{ADDRESS_LEN, CHAIN_CODE_LEN, PUBLIC_KEY_LEN},
    tx::SIGNATURE_LEN,
};

use super::Error;

/// BIP32 extended private key, as returned by a [`Driver`]
///
/// Key material is zeroized on drop.
pub struct ExtendedKey {
    /// secp256k1 private scalar
    pub private_key: [u8; 32],
    /// BIP32 chain code
    pub chain_code: [u8; CHAIN_CODE_LEN],
}

impl ExtendedKey {
    /// Create an extended key from raw parts
    pub fn new(private_key: [u8; 32], chain_code: [u8; CHAIN_CODE_LEN]) -> Self {
        Self {
            private_key,
            chain_code,
        }
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.private_key.zeroize();
        self.chain_code.zeroize();
    }
}

/// [`Driver`] trait provides platform support for [`Engine`][super::Engine] instances
pub trait Driver {
    /// BIP32 derivation for secp256k1 keys
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> Result<ExtendedKey, Error>;
}

impl<T: Driver> Driver for &mut T {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> Result<ExtendedKey, Error> {
        T::bip32_derive_secp256k1(self, path)
    }
}

/// Derived signing key and chain code, scoped to a single request
pub struct KeyPair {
    signing_key: SigningKey,
    chain_code: [u8; CHAIN_CODE_LEN],
}

impl KeyPair {
    /// Derive a key pair for the provided path via the platform [`Driver`]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn derive<DRV: Driver>(drv: &DRV, path: &[u32]) -> Result<Self, Error> {
        let k = drv.bip32_derive_secp256k1(path)?;

        let signing_key = SigningKey::from_slice(&k.private_key).map_err(|_| {
            #[cfg(feature = "log")]
            log::error!("derived key is not a valid scalar");

            Error::SignFailed
        })?;

        Ok(Self {
            signing_key,
            chain_code: k.chain_code,
        })
    }

    /// Compressed SEC1 public key
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LEN] {
        let p = self.signing_key.verifying_key().to_encoded_point(true);

        let mut b = [0u8; PUBLIC_KEY_LEN];
        b.copy_from_slice(p.as_bytes());
        b
    }

    /// BIP32 chain code
    pub fn chain_code(&self) -> [u8; CHAIN_CODE_LEN] {
        self.chain_code
    }

    /// Address for this key, the trailing 20 bytes of the keccak256 digest
    /// of the uncompressed public key (without the `0x04` tag)
    pub fn address(&self) -> [u8; ADDRESS_LEN] {
        let p = self.signing_key.verifying_key().to_encoded_point(false);
        let h = Keccak256::digest(&p.as_bytes()[1..]);

        let mut a = [0u8; ADDRESS_LEN];
        a.copy_from_slice(&h[h.len() - ADDRESS_LEN..]);
        a
    }

    /// Sign the SHA-256 digest of `msg`, returning the compact `r || s`
    /// signature (low-S) and recovery id
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn sign(&self, msg: &[u8]) -> Result<([u8; SIGNATURE_LEN], u8), Error> {
        let digest = Sha256::digest(msg);

        let (sig, recid) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|_| Error::SignFailed)?;

        let mut s = [0u8; SIGNATURE_LEN];
        s.copy_from_slice(&sig.to_bytes());

        Ok((s, recid.to_byte()))
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.chain_code.zeroize();
    }
}
