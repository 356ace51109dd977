// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing tests

use std::future::Future;

use encdec::Encode;
use log::{debug, info};

use ledger_crab::{
    apdu::{tx::Transaction, DerivationPath},
    verify_signature, DeviceHandle, Error, Exchange,
};

pub struct TransactionExpectation<'a> {
    /// Account index for signing (`m/44'/535348'/{account}'`)
    pub account: u32,
    pub nonce: u64,
    pub coin: &'a str,
    pub value: u64,
    pub to: [u8; 20],
    pub memo: &'a str,
    /// Whether the transaction is approved on the device
    pub approve: bool,
}

impl<'a> TransactionExpectation<'a> {
    pub fn path(&self) -> anyhow::Result<DerivationPath> {
        Ok(DerivationPath::account(self.account).map_err(Error::from)?)
    }

    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        let tx = Transaction::new(self.nonce, self.coin, self.value, self.to, self.memo)
            .map_err(Error::from)?;

        let mut b = vec![0u8; tx.encode_len().map_err(Error::from)?];
        tx.encode(&mut b).map_err(Error::from)?;

        Ok(b)
    }
}

const TO: [u8; 20] = [
    0xde, 0x0b, 0x29, 0x56, 0x69, 0xa9, 0xfd, 0x93, 0xd5, 0xf2, 0x8d, 0x9e, 0xc8, 0x5e, 0x40, 0xf4,
    0xcb, 0x69, 0x7b, 0xae,
];

const LONG_MEMO: &str = "Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab \
    Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab \
    Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab \
    Crab Crab Crab Crab Crab Crab Crab Crab Crab Crab";

pub const TRANSACTIONS: &[TransactionExpectation<'static>] = &[
    TransactionExpectation {
        account: 0,
        nonce: 1,
        coin: "CRAB",
        value: 666,
        to: TO,
        memo: "short",
        approve: true,
    },
    TransactionExpectation {
        account: 0,
        nonce: 1,
        coin: "CRAB",
        value: 666,
        to: TO,
        memo: LONG_MEMO,
        approve: true,
    },
    TransactionExpectation {
        account: 0,
        nonce: 1,
        coin: "CRAB",
        value: 666,
        to: TO,
        memo: "short",
        approve: false,
    },
];

/// Sign a transaction on the device and validate the returned signature
///
/// `review` is called with the expected outcome and must approve or reject
/// the transaction on the device.
pub async fn test<'a, T, F>(
    t: T,
    review: impl Fn(bool) -> F,
    tx: &TransactionExpectation<'a>,
) -> anyhow::Result<()>
where
    T: Exchange + Send,
    F: Future<Output = ()>,
{
    let path = tx.path()?;
    let encoded = tx.encode()?;

    debug!("Encoded transaction: {}", hex::encode(&encoded));

    let d = DeviceHandle::from(t);

    // Fetch signing key
    let k = d.public_key(&path, false).await?;

    info!(
        "Signing transaction ({} bytes, approve: {}) with path: {}",
        encoded.len(),
        tx.approve,
        path
    );

    let (r, _) = tokio::join!(d.sign_tx(&path, &encoded), review(tx.approve));

    if !tx.approve {
        assert!(
            matches!(r, Err(Error::UserDenied)),
            "expected user denial, got: {r:?}"
        );

        info!("Transaction rejected");
        return Ok(());
    }

    let sig = r?;

    info!("Transaction signed! validating signature");

    verify_signature(&k.public_key, &encoded, &sig)?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn long_memo_spans_chunks() {
        let b = TRANSACTIONS[1].encode().unwrap();
        assert!(b.len() > ledger_crab::apdu::MAX_APDU_DATA);
    }
}
