// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Public key and address tests

use std::future::Future;

use log::info;
use sha3::{Digest, Keccak256};

use ledger_crab::{apdu::DerivationPath, DeviceHandle, Error, Exchange};

/// Fetch the public key for a path and check it against local derivation,
/// then request the same key with on-device display.
///
/// `review` is called with `true` to approve or `false` to reject the displayed
/// address, and must complete the review on the device.
pub async fn test<T, F>(
    t: T,
    review: impl Fn(bool) -> F,
    mnemonic: &str,
    path: &DerivationPath,
) -> anyhow::Result<()>
where
    T: Exchange + Send,
    F: Future<Output = ()>,
{
    // Generate expected keys
    let x = crate::derive(mnemonic, path)?;
    let expected_key = x.public_key().to_bytes();

    let p = x.private_key().verifying_key().to_encoded_point(false);
    let h = Keccak256::digest(&p.as_bytes()[1..]);
    let expected_address = &h[12..];

    info!("expected public key: {}", hex::encode(expected_key));
    info!("expected address: 0x{}", hex::encode(expected_address));

    let d = DeviceHandle::from(t);

    // Silent request
    let k = d.public_key(path, false).await?;

    info!("received public key: {}", hex::encode(k.public_key));
    info!("received address: 0x{}", hex::encode(k.address));

    assert_eq!(k.public_key, expected_key);
    assert_eq!(k.chain_code, x.attrs().chain_code);
    assert_eq!(&k.address[..], expected_address);

    // Displayed and approved
    let (r, _) = tokio::join!(d.public_key(path, true), review(true));
    assert_eq!(r?, k);

    // Displayed and rejected
    let (r, _) = tokio::join!(d.public_key(path, true), review(false));
    assert!(
        matches!(r, Err(Error::UserDenied)),
        "expected user denial, got: {r:?}"
    );

    Ok(())
}
