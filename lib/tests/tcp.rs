// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Emulator served over the speculos TCP framing

use ledger_crab::apdu::DerivationPath;
use ledger_crab_tests::{
    app_info, emulator_review, public_key,
    transaction::{self, TRANSACTIONS},
    MNEMONIC,
};

mod helpers;
use helpers::setup_tcp;

#[tokio::test]
async fn app_info() -> anyhow::Result<()> {
    let (_e, t) = setup_tcp().await;

    app_info::test(t).await
}

#[tokio::test]
async fn public_key() -> anyhow::Result<()> {
    let (e, t) = setup_tcp().await;

    let path = DerivationPath::account(3).unwrap();

    public_key::test(t, |approve| emulator_review(&e, approve), MNEMONIC, &path).await
}

#[tokio::test]
async fn tx() -> anyhow::Result<()> {
    for v in TRANSACTIONS {
        let (e, t) = setup_tcp().await;

        transaction::test(t, |approve| emulator_review(&e, approve), v).await?;
    }

    Ok(())
}
