// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(unused)]

use bip39::{Language, Mnemonic, Seed};
use encdec::Encode;
use log::{debug, trace};

use ledger_crab_core::{
    apdu::{prelude::*, MAX_APDU_DATA},
    dispatcher::{Dispatcher, Reply, Response},
    engine::{Config, Driver, Engine, Error, ExtendedKey},
};

pub const MNEMONIC: &str = "glory promote mansion idle axis finger extra february uncover one trip resource lawn turtle enact monster seven myth punch hobby comfort wild raise skin";

pub const TO: [u8; 20] = [
    0xde, 0x0b, 0x29, 0x56, 0x69, 0xa9, 0xfd, 0x93, 0xd5, 0xf2, 0x8d, 0x9e, 0xc8, 0x5e, 0x40,
    0xf4, 0xcb, 0x69, 0x7b, 0xae,
];

pub fn setup_logging() {
    let _ = simplelog::SimpleLogger::init(log::LevelFilter::Debug, Default::default());
}

/// Driver implementation for test use, deriving keys from a BIP39 seed
pub struct TestDriver {
    seed: Seed,
}

impl TestDriver {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    pub fn from_mnemonic(m: &str) -> anyhow::Result<Self> {
        let mnemonic = Mnemonic::from_phrase(m, Language::English)?;
        Ok(Self::new(Seed::new(&mnemonic, "")))
    }

    /// Derive an extended key directly via bip32
    pub fn xprv(&self, path: &[u32]) -> bip32::XPrv {
        let mut k = bip32::XPrv::new(self.seed.as_bytes()).unwrap();
        for p in path {
            k = k.derive_child(bip32::ChildNumber(*p)).unwrap();
        }
        k
    }
}

impl Driver for TestDriver {
    fn bip32_derive_secp256k1(&self, path: &[u32]) -> Result<ExtendedKey, Error> {
        let mut k = bip32::XPrv::new(self.seed.as_bytes()).map_err(|_| Error::InvalidPath)?;
        for p in path {
            k = k
                .derive_child(bip32::ChildNumber(*p))
                .map_err(|_| Error::InvalidPath)?;
        }

        Ok(ExtendedKey::new(k.to_bytes(), k.attrs().chain_code))
    }
}

/// Create a dispatcher backed by the test mnemonic
pub fn dispatcher(cfg: Config) -> Dispatcher<TestDriver> {
    setup_logging();

    let drv = TestDriver::from_mnemonic(MNEMONIC).unwrap();
    Dispatcher::new(Engine::with_config(drv, cfg))
}

/// Build a request frame
pub fn frame(header: ApduHeader, data: &[u8]) -> Vec<u8> {
    let mut b = vec![0u8; 5 + data.len()];
    header.write(data.len(), &mut b).unwrap();
    b[5..].copy_from_slice(data);
    b
}

/// Encode a derivation path for a request payload
pub fn path_bytes(path: &DerivationPath) -> Vec<u8> {
    let mut b = vec![0u8; path.encode_len().unwrap()];
    path.encode(&mut b).unwrap();
    b
}

/// Encode a transaction
pub fn tx_bytes(memo: &str) -> Vec<u8> {
    let tx = Transaction::new(1, "CRAB", 666, TO, memo).unwrap();
    let mut b = vec![0u8; tx.encode_len().unwrap()];
    tx.encode(&mut b).unwrap();
    b
}

/// Build the full `SIGN_TX` frame sequence for a transaction
pub fn sign_tx_frames(path: &DerivationPath, tx: &[u8]) -> Vec<Vec<u8>> {
    let mut frames = vec![frame(SignTx::header(0, true), &path_bytes(path))];

    for c in Chunks::new(tx) {
        frames.push(frame(SignTx::header(c.index as u8 + 1, c.more), c.data));
    }

    frames
}

/// Response frame split into payload and status word
#[derive(Clone, PartialEq, Debug)]
pub struct Resp {
    pub data: Vec<u8>,
    pub status: StatusWord,
}

impl Resp {
    pub fn from_response(r: Response, buff: &[u8]) -> Self {
        let (data, status) = StatusWord::split(&buff[..r.len]).expect("invalid response frame");
        let status = status.expect("unknown status word");

        assert_eq!(status, r.status);

        Self {
            data: data.to_vec(),
            status,
        }
    }
}

/// Send a request frame, returning `None` if the response is deferred
pub fn send(d: &mut Dispatcher<TestDriver>, apdu: &[u8]) -> Option<Resp> {
    let mut buff = [0u8; 256];

    trace!("request: {:02x?}", apdu);

    match d.handle(apdu, &mut buff) {
        Reply::Ready(r) => {
            let r = Resp::from_response(r, &buff);
            debug!("response: {:02x?}", r);
            Some(r)
        }
        Reply::Pending => None,
    }
}

/// Send a sequence of `SIGN_TX` frames, checking intermediate responses
pub fn send_tx(d: &mut Dispatcher<TestDriver>, path: &DerivationPath, tx: &[u8]) -> Option<Resp> {
    let frames = sign_tx_frames(path, tx);
    let n = frames.len();

    for (i, f) in frames.iter().enumerate() {
        let r = send(d, f);

        if i + 1 < n {
            let r = r.expect("intermediate chunk deferred");
            assert_eq!(r.status, StatusWord::Ok, "chunk {i} failed");
            assert!(r.data.is_empty());
        } else {
            return r;
        }
    }

    None
}

/// Resolve a pending review
pub fn confirm(d: &mut Dispatcher<TestDriver>, approve: bool) -> Resp {
    let mut buff = [0u8; 256];
    let r = d.confirm(approve, &mut buff).expect("no review pending");
    Resp::from_response(r, &buff)
}
