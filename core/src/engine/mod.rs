// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides functionality required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.
//!
//! Transaction signing moves through `Idle → AwaitingData → AwaitingApproval`,
//! at which point the engine waits for the user to [approve][Engine::approve] or
//! [deny][Engine::deny] the transaction (or for the review to time out via
//! [tick][Engine::tick]). Only approval produces a signature.

use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use ledger_crab_apdu::{
    public_key::{PublicKeyMode, ADDRESS_LEN},
    tx::{SignTx, Transaction, TxProgress},
    ApduStatic, DerivationPath,
};

use crate::consts::{APPROVAL_TIMEOUT_S, APP_NAME, APP_VERSION, MAX_TX_LEN, TICKS_PER_S};

mod error;
pub use error::Error;

mod event;
pub use event::Event;

mod output;
pub use output::Output;

mod keys;
pub use keys::{Driver, ExtendedKey, KeyPair};

mod reassembly;
pub use reassembly::{Progress, Reassembler};

/// Engine internal state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// Idle state, no transaction running
    Idle,
    /// Receiving transaction chunks
    AwaitingData,
    /// Transaction pending user approval
    AwaitingApproval,
    /// Transaction approved, signing
    Approved,
    /// Transaction rejected by the user or timed out
    Rejected,
    /// Transaction complete
    Terminal(Outcome),
    /// Address pending user confirmation
    VerifyAddress,
}

/// Transaction outcome, see [`State::Terminal`]
#[derive(
    Copy, Clone, PartialEq, Debug, Default, EnumString, Display, EnumVariantNames, EnumIter,
)]
pub enum Outcome {
    /// Signature returned to the host
    #[default]
    Signed,
    /// Transaction denied / aborted
    Denied,
    /// Signing failed
    Failed,
}

/// Engine configuration
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Config {
    /// Platform tick rate
    pub ticks_per_s: u32,
    /// Timeout for pending reviews, `0` disables the timeout
    pub approval_timeout_s: u32,
    /// Include the memo in transaction reviews
    pub show_memo: bool,
}

impl Config {
    /// Default engine configuration
    pub const fn new() -> Self {
        Self {
            ticks_per_s: TICKS_PER_S,
            approval_timeout_s: APPROVAL_TIMEOUT_S,
            show_memo: true,
        }
    }

    fn timeout_ticks(&self) -> Option<u32> {
        match self.approval_timeout_s {
            0 => None,
            n => Some(n.saturating_mul(self.ticks_per_s)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending review information for display
#[derive(Clone, PartialEq, Debug)]
pub enum Review<'a> {
    /// Transaction pending approval
    Transaction {
        path: &'a DerivationPath,
        tx: Transaction<'a>,
        show_memo: bool,
    },
    /// Address pending confirmation
    Address {
        path: &'a DerivationPath,
        address: [u8; ADDRESS_LEN],
    },
}

/// [Engine] provides hardware-independent support for Crab wallet operations
///
pub struct Engine<DRV: Driver> {
    state: State,
    cfg: Config,

    /// Derivation path for the in-flight request
    path: Option<DerivationPath>,

    /// Transaction reassembly buffer
    rx: Reassembler<MAX_TX_LEN>,

    /// Public key held pending address confirmation
    verify: Option<Output>,

    /// Ticks elapsed in the current review
    ticks: u32,

    drv: DRV,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    /// and default configuration
    pub const fn new(drv: DRV) -> Self {
        Self::with_config(drv, Config::new())
    }

    /// Create a new engine instance with the provided driver and configuration
    pub const fn with_config(drv: DRV, cfg: Config) -> Self {
        Self {
            state: State::Idle,
            cfg,
            path: None,
            rx: Reassembler::new(),
            verify: None,
            ticks: 0,
            drv,
        }
    }

    /// Handle incoming events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match (self.state, evt) {
            // Empty event, do nothing
            (_, Event::None) => Ok(Output::None),

            // Application information is always available
            (_, Event::GetVersion) => Ok(Output::Version {
                major: APP_VERSION.0,
                minor: APP_VERSION.1,
                patch: APP_VERSION.2,
            }),
            (_, Event::GetAppName) => Ok(Output::AppName { name: APP_NAME }),

            // Only one review may be pending at a time
            (
                State::AwaitingApproval | State::VerifyAddress,
                Event::GetPublicKey { .. } | Event::TxStart { .. } | Event::TxChunk { .. },
            ) => {
                #[cfg(feature = "log")]
                log::warn!("review pending, rejecting request");

                Err(Error::Busy)
            }

            // Fetch a public key
            (_, Event::GetPublicKey { path, mode }) => {
                let k = KeyPair::derive(&self.drv, path.elems())?;

                let o = Output::PublicKey {
                    public_key: k.public_key(),
                    chain_code: k.chain_code(),
                    address: k.address(),
                };

                // Key material is dropped here, only public values are retained
                drop(k);

                match mode {
                    PublicKeyMode::Silent => Ok(o),
                    PublicKeyMode::Display => {
                        // Address review replaces any in-flight transaction
                        self.clear_session();

                        self.path = Some(path.clone());
                        self.verify = Some(o);
                        self.ticks = 0;
                        self.set_state(State::VerifyAddress);

                        Ok(Output::Pending)
                    }
                }
            }

            // Restarted sequence without terminator
            (State::AwaitingData, Event::TxStart { .. }) => {
                #[cfg(feature = "log")]
                log::warn!("transaction restarted before completion, aborting");

                self.abort();
                Err(Error::Transport)
            }

            // Start a new transaction session
            (_, Event::TxStart { path }) => {
                self.clear_session();

                self.path = Some(path.clone());
                self.rx.start(SignTx::INS, 1);
                self.set_state(State::AwaitingData);

                Ok(Output::None)
            }

            // Accumulate transaction data
            (State::AwaitingData, Event::TxChunk { index, more, data }) => {
                self.tx_chunk(*index, *more, data)
            }

            // Handle unexpected events
            _e => {
                #[cfg(feature = "log")]
                log::error!("Unexpected event in state {:?}: {:02x?}", self.state, _e);

                Err(Error::InvalidState)
            }
        }
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.state
    }

    /// Fetch engine configuration
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Fetch the platform driver
    pub fn driver(&self) -> &DRV {
        &self.drv
    }

    /// Check whether a review is awaiting user input
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::AwaitingApproval | State::VerifyAddress)
    }

    /// Fetch the transaction pending approval
    pub fn transaction(&self) -> Option<Transaction<'_>> {
        match self.state {
            State::AwaitingApproval => Transaction::parse(self.rx.data()).ok(),
            _ => None,
        }
    }

    /// Fetch information for the pending review
    pub fn review(&self) -> Option<Review<'_>> {
        let path = self.path.as_ref()?;

        match (self.state, &self.verify) {
            (State::AwaitingApproval, _) => self
                .transaction()
                .map(|tx| Review::Transaction {
                    path,
                    tx,
                    show_memo: self.cfg.show_memo,
                }),
            (State::VerifyAddress, Some(Output::PublicKey { address, .. })) => {
                Some(Review::Address {
                    path,
                    address: *address,
                })
            }
            _ => None,
        }
    }

    /// Approve the pending review
    ///
    /// For transactions this produces the [`Output::Signature`], for
    /// address confirmation the held [`Output::PublicKey`].
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn approve(&mut self) -> Result<Output, Error> {
        match self.state {
            State::AwaitingApproval => {
                self.set_state(State::Approved);
                self.sign()
            }
            State::VerifyAddress => {
                let o = self.verify.take();
                self.clear_session();
                self.set_state(State::Idle);

                o.ok_or(Error::InvalidState)
            }
            _ => Err(Error::UnexpectedEvent),
        }
    }

    /// Deny the pending review, returns [`Error::Deny`] for reporting to the host
    pub fn deny(&mut self) -> Result<Output, Error> {
        match self.state {
            State::AwaitingApproval => {
                self.set_state(State::Rejected);
                self.clear_session();
                self.set_state(State::Terminal(Outcome::Denied));

                Err(Error::Deny)
            }
            State::VerifyAddress => {
                self.clear_session();
                self.set_state(State::Idle);

                Err(Error::Deny)
            }
            _ => Err(Error::UnexpectedEvent),
        }
    }

    /// Platform tick, denies pending reviews once the approval timeout expires
    ///
    /// Returns the resolved review when a timeout occurs.
    pub fn tick(&mut self) -> Option<Result<Output, Error>> {
        if !self.is_pending() {
            return None;
        }

        let timeout = self.cfg.timeout_ticks()?;

        self.ticks = self.ticks.saturating_add(1);
        if self.ticks < timeout {
            return None;
        }

        #[cfg(feature = "log")]
        log::warn!("review timed out in state {}", self.state);

        Some(self.deny())
    }

    /// Reset engine state
    pub fn reset(&mut self) {
        self.clear_session();
        self.set_state(State::Idle);
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn tx_chunk(&mut self, index: u8, more: bool, data: &[u8]) -> Result<Output, Error> {
        let progress = match self.rx.push(SignTx::INS, index, more, data) {
            Ok(p) => p,
            Err(e) => {
                self.abort();
                return Err(e);
            }
        };

        // Check whether the buffered bytes hold a whole transaction
        let complete = match Transaction::decode_partial(self.rx.data()) {
            Ok(TxProgress::NeedMore(Some(n))) if n > MAX_TX_LEN => Err(Error::TxTooLong),
            Ok(TxProgress::NeedMore(_)) => Ok(false),
            Ok(TxProgress::Complete(_tx)) => {
                #[cfg(feature = "log")]
                log::debug!("transaction: {:?}", _tx);

                Ok(true)
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                log::warn!("transaction decode failed: {:?}", _e);

                Err(Error::Parse)
            }
        };

        match (complete, progress) {
            (Err(e), _) => {
                self.abort();
                Err(e)
            }
            (Ok(_), Progress::More) => Ok(Output::None),
            (Ok(true), Progress::Complete) => {
                self.ticks = 0;
                self.set_state(State::AwaitingApproval);

                Ok(Output::Pending)
            }
            (Ok(false), Progress::Complete) => {
                self.abort();
                Err(Error::Parse)
            }
        }
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn sign(&mut self) -> Result<Output, Error> {
        let r = match &self.path {
            Some(path) => KeyPair::derive(&self.drv, path.elems())
                .and_then(|k| k.sign(self.rx.data())),
            None => Err(Error::InvalidState),
        };

        self.clear_session();

        match r {
            Ok((signature, v)) => {
                self.set_state(State::Terminal(Outcome::Signed));
                Ok(Output::Signature { signature, v })
            }
            Err(_e) => {
                #[cfg(feature = "log")]
                log::error!("signing failed: {:?}", _e);

                self.set_state(State::Terminal(Outcome::Failed));
                Err(Error::SignFailed)
            }
        }
    }

    /// Abort the in-flight session
    fn abort(&mut self) {
        self.clear_session();
        self.set_state(State::Idle);
    }

    fn clear_session(&mut self) {
        self.rx.clear();
        self.path = None;
        self.verify = None;
        self.ticks = 0;
    }

    fn set_state(&mut self, s: State) {
        #[cfg(feature = "log")]
        if s != self.state {
            log::debug!("state {} -> {}", self.state, s);
        }

        self.state = s;
    }
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::{string::String, vec, vec::Vec};

    use encdec::Encode;
    use k256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};
    use sha2::{Digest, Sha256};
    use strum::IntoEnumIterator;

    use ledger_crab_apdu::MAX_APDU_DATA;

    use super::*;

    pub const TO: [u8; 20] = [
        0xde, 0x0b, 0x29, 0x56, 0x69, 0xa9, 0xfd, 0x93, 0xd5, 0xf2, 0x8d, 0x9e, 0xc8, 0x5e, 0x40,
        0xf4, 0xcb, 0x69, 0x7b, 0xae,
    ];

    lazy_static::lazy_static! {
        static ref PATH: DerivationPath = "m/44'/1'/0'/0/0".parse().unwrap();

        static ref TX_BYTES: Vec<u8> = encode_tx("For u EthDev");

        /// (State, Event) pairs valid in sequence
        static ref TESTS: [(State, Event<'static>); 3] = [
            (State::Idle, Event::TxStart{ path: PATH.clone() }),
            (
                State::AwaitingData,
                Event::TxChunk {
                    index: 1,
                    more: false,
                    data: TX_BYTES.as_slice(),
                },
            ),
            (State::AwaitingApproval, Event::GetVersion),
        ];
    }

    fn encode_tx(memo: &str) -> Vec<u8> {
        let tx = Transaction::new(1, "CRAB", 666, TO, memo).unwrap();
        let mut b = vec![0u8; tx.encode_len().unwrap()];
        tx.encode(&mut b).unwrap();
        b
    }

    /// Driver implementation for test use
    pub struct TestDriver {
        /// BIP39 Mnemonic derived seed
        pub seed: [u8; 64],
    }

    impl TestDriver {
        /// Create a new test driver with a random seed
        pub fn new() -> Self {
            let mut seed = [0u8; 64];
            rand::Rng::fill(&mut rand::thread_rng(), &mut seed[..]);
            Self { seed }
        }

        /// Derive an extended key directly via bip32
        pub fn xprv(&self, path: &[u32]) -> bip32::XPrv {
            let mut k = bip32::XPrv::new(self.seed).unwrap();
            for p in path {
                k = k.derive_child(bip32::ChildNumber(*p)).unwrap();
            }
            k
        }
    }

    /// Driver impl for test use
    impl Driver for TestDriver {
        fn bip32_derive_secp256k1(&self, path: &[u32]) -> Result<ExtendedKey, Error> {
            let mut k = bip32::XPrv::new(self.seed).map_err(|_| Error::InvalidPath)?;
            for p in path {
                k = k
                    .derive_child(bip32::ChildNumber(*p))
                    .map_err(|_| Error::InvalidPath)?;
            }

            Ok(ExtendedKey::new(k.to_bytes(), k.attrs().chain_code))
        }
    }

    fn engine() -> Engine<TestDriver> {
        let _ = simplelog::TermLogger::init(
            log::LevelFilter::Debug,
            Default::default(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        );

        Engine::new(TestDriver::new())
    }

    /// Load a transaction into the engine in frame sized chunks
    fn load_tx(e: &mut Engine<TestDriver>, tx: &[u8]) -> Result<Output, Error> {
        e.update(&Event::TxStart { path: PATH.clone() })?;

        let n = (tx.len() + MAX_APDU_DATA - 1) / MAX_APDU_DATA;
        let mut r = Ok(Output::None);

        for (i, c) in tx.chunks(MAX_APDU_DATA).enumerate() {
            r = e.update(&Event::TxChunk {
                index: i as u8 + 1,
                more: i + 1 < n,
                data: c,
            });

            if r.is_err() {
                break;
            }
        }

        r
    }

    /// Step through valid events and states
    #[test]
    fn valid_events() {
        let mut e = engine();

        for (state, evt) in &*TESTS {
            assert_eq!(e.state(), *state);

            // Fire expected event
            let r = e.update(evt);

            // Check response is okay
            assert!(r.is_ok(), "event {evt:?} failed, error response: {r:?}");
        }
    }

    /// Ensure we're handling chunks outside of a session
    #[test]
    fn invalid_events() {
        let evt = &TESTS[1].1;

        for state in State::iter() {
            if state == State::AwaitingData {
                continue;
            }

            let mut e = engine();
            e.state = state;

            // Fire incorrect event
            let r = e.update(evt);

            let expected = match state {
                State::AwaitingApproval | State::VerifyAddress => Error::Busy,
                _ => Error::InvalidState,
            };
            assert_eq!(r, Err(expected), "state: {state}");
        }
    }

    #[test]
    fn app_info() {
        let mut e = engine();

        assert_eq!(
            e.update(&Event::GetAppName),
            Ok(Output::AppName { name: "Crab" })
        );
        assert!(matches!(
            e.update(&Event::GetVersion),
            Ok(Output::Version { .. })
        ));
    }

    #[test]
    fn public_key_silent() {
        let mut e = engine();

        let r = e
            .update(&Event::GetPublicKey {
                path: PATH.clone(),
                mode: PublicKeyMode::Silent,
            })
            .unwrap();

        let x = e.drv.xprv(PATH.elems());
        let expected_pub = x.public_key().to_bytes();

        match r {
            Output::PublicKey {
                public_key,
                chain_code,
                ..
            } => {
                assert_eq!(public_key, expected_pub);
                assert_eq!(chain_code, x.attrs().chain_code);
            }
            _ => panic!("unexpected output: {r:?}"),
        }

        assert_eq!(e.state(), State::Idle);
    }

    #[test]
    fn public_key_display() {
        let mut e = engine();

        let evt = Event::GetPublicKey {
            path: PATH.clone(),
            mode: PublicKeyMode::Display,
        };

        // Approve address
        assert_eq!(e.update(&evt), Ok(Output::Pending));
        assert_eq!(e.state(), State::VerifyAddress);
        assert!(matches!(e.review(), Some(Review::Address { .. })));

        // Further interactive requests are rejected while pending
        assert_eq!(e.update(&evt), Err(Error::Busy));

        let r = e.approve().unwrap();
        assert!(matches!(r, Output::PublicKey { .. }));
        assert_eq!(e.state(), State::Idle);

        // Reject address
        assert_eq!(e.update(&evt), Ok(Output::Pending));
        assert_eq!(e.deny(), Err(Error::Deny));
        assert_eq!(e.state(), State::Idle);
    }

    #[test]
    fn sign_approve() {
        let mut e = engine();

        let r = load_tx(&mut e, &TX_BYTES).unwrap();
        assert_eq!(r, Output::Pending);
        assert_eq!(e.state(), State::AwaitingApproval);

        // Review shows the decoded transaction
        let tx = e.transaction().unwrap();
        assert_eq!((tx.coin, tx.value, tx.to, tx.memo), ("CRAB", 666, TO, "For u EthDev"));

        let (signature, v) = match e.approve().unwrap() {
            Output::Signature { signature, v } => (signature, v),
            r => panic!("unexpected output: {r:?}"),
        };
        assert!(v <= 1);
        assert_eq!(e.state(), State::Terminal(Outcome::Signed));

        // Verify signature over the exact transaction bytes
        let x = e.drv.xprv(PATH.elems());
        let vk = VerifyingKey::from_sec1_bytes(&x.public_key().to_bytes()).unwrap();
        let sig = Signature::from_slice(&signature).unwrap();
        vk.verify_prehash(&Sha256::digest(TX_BYTES.as_slice()), &sig)
            .unwrap();

        // Further chunks are rejected
        let r = e.update(&Event::TxChunk {
            index: 2,
            more: false,
            data: &[0],
        });
        assert_eq!(r, Err(Error::InvalidState));
    }

    #[test]
    fn sign_long_memo() {
        let mut e = engine();

        let memo: String = core::iter::repeat('m').take(300).collect();
        let tx = encode_tx(&memo);
        assert!(tx.len() > MAX_APDU_DATA);

        assert_eq!(load_tx(&mut e, &tx), Ok(Output::Pending));
        assert_eq!(e.transaction().unwrap().memo, memo.as_str());

        assert!(matches!(e.approve(), Ok(Output::Signature { .. })));
    }

    #[test]
    fn sign_deny() {
        let mut e = engine();

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));

        assert_eq!(e.deny(), Err(Error::Deny));
        assert_eq!(e.state(), State::Terminal(Outcome::Denied));

        // No approval once denied
        assert_eq!(e.approve(), Err(Error::UnexpectedEvent));
    }

    #[test]
    fn busy_while_pending() {
        let mut e = engine();

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));

        assert_eq!(
            e.update(&Event::TxStart { path: PATH.clone() }),
            Err(Error::Busy)
        );
        assert_eq!(
            e.update(&Event::GetPublicKey {
                path: PATH.clone(),
                mode: PublicKeyMode::Silent
            }),
            Err(Error::Busy)
        );

        // Review is unaffected
        assert_eq!(e.state(), State::AwaitingApproval);
        assert!(e.transaction().is_some());
    }

    #[test]
    fn restart_aborts() {
        let mut e = engine();

        e.update(&Event::TxStart { path: PATH.clone() }).unwrap();
        e.update(&Event::TxChunk {
            index: 1,
            more: true,
            data: &TX_BYTES[..10],
        })
        .unwrap();

        assert_eq!(
            e.update(&Event::TxStart { path: PATH.clone() }),
            Err(Error::Transport)
        );
        assert_eq!(e.state(), State::Idle);
    }

    #[test]
    fn out_of_order_chunk() {
        let mut e = engine();

        e.update(&Event::TxStart { path: PATH.clone() }).unwrap();
        let r = e.update(&Event::TxChunk {
            index: 2,
            more: false,
            data: &TX_BYTES,
        });

        assert_eq!(r, Err(Error::Transport));
        assert_eq!(e.state(), State::Idle);
    }

    #[test]
    fn malformed_transactions() {
        let mut e = engine();

        // Truncated
        assert_eq!(
            load_tx(&mut e, &TX_BYTES[..TX_BYTES.len() - 1]),
            Err(Error::Parse)
        );
        assert_eq!(e.state(), State::Idle);

        // Trailing bytes
        let mut t = TX_BYTES.clone();
        t.push(0xff);
        assert_eq!(load_tx(&mut e, &t), Err(Error::Parse));

        // Invalid coin
        let mut t = TX_BYTES.clone();
        t[8] = 0;
        assert_eq!(load_tx(&mut e, &t), Err(Error::Parse));
    }

    #[test]
    fn too_long() {
        let mut e = engine();

        let memo: String = core::iter::repeat('m').take(MAX_TX_LEN).collect();
        let tx = encode_tx(&memo);

        let r = load_tx(&mut e, &tx);
        assert_eq!(r, Err(Error::TxTooLong));
        assert_eq!(e.state(), State::Idle);
    }

    #[test]
    fn approval_timeout() {
        let cfg = Config {
            ticks_per_s: 2,
            approval_timeout_s: 3,
            ..Config::new()
        };
        let mut e = Engine::with_config(TestDriver::new(), cfg);

        // No timeout outside of reviews
        for _ in 0..10 {
            assert_eq!(e.tick(), None);
        }

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));

        for _ in 0..5 {
            assert_eq!(e.tick(), None);
        }

        assert_eq!(e.tick(), Some(Err(Error::Deny)));
        assert_eq!(e.state(), State::Terminal(Outcome::Denied));
        assert_eq!(e.tick(), None);
    }

    #[test]
    fn timeout_disabled() {
        let cfg = Config {
            ticks_per_s: 1,
            approval_timeout_s: 0,
            ..Config::new()
        };
        let mut e = Engine::with_config(TestDriver::new(), cfg);

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));
        for _ in 0..100 {
            assert_eq!(e.tick(), None);
        }
        assert_eq!(e.state(), State::AwaitingApproval);
    }

    #[test]
    fn hidden_memo() {
        let cfg = Config {
            show_memo: false,
            ..Config::new()
        };
        let mut e = Engine::with_config(TestDriver::new(), cfg);

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));
        assert!(matches!(
            e.review(),
            Some(Review::Transaction {
                show_memo: false,
                ..
            })
        ));

        // Hidden memos are still signed over
        assert!(matches!(e.approve(), Ok(Output::Signature { .. })));
    }

    #[test]
    fn reset() {
        let mut e = engine();

        assert_eq!(load_tx(&mut e, &TX_BYTES), Ok(Output::Pending));
        e.reset();

        assert_eq!(e.state(), State::Idle);
        assert!(e.review().is_none());
        assert_eq!(e.approve(), Err(Error::UnexpectedEvent));
    }
}
