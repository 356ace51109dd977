// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Ledger Crab API Library (and CLI)
//!
//! Provides a [DeviceHandle] for interacting with Crab hardware wallets over
//! any [Exchange] implementation, a TCP (speculos-compatible) transport, and an
//! in-process [Emulator] running the `ledger-crab-core` engine.

use std::time::Duration;

use async_trait::async_trait;

/// Re-export transports for consumer use
pub mod transport;
use transport::*;

/// Re-export `ledger-crab-apdu` for consumers
pub use ledger_crab_apdu::{self as apdu};

mod handle;
pub use handle::{signature_der, verify_signature, CrabAppInfo, DeviceHandle};

mod error;
pub use error::Error;

mod driver;
pub use driver::SeedDriver;

pub mod emulator;
pub use emulator::Emulator;

/// Exchange trait for raw APDU transports
///
/// Commands are complete request frames (header, `Lc` and payload),
/// responses include the trailing status word.
#[async_trait]
pub trait Exchange {
    /// Send a request frame and await the response
    async fn exchange(&mut self, command: &[u8], timeout: Duration) -> Result<Vec<u8>, Error>;
}

/// Device target selection
#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum Target {
    /// In-process emulator
    Emulator,
    /// TCP connection for speculos simulator
    Tcp,
}

/// Generic ledger device handle (abstract over transport types)
pub type GenericHandle = DeviceHandle<GenericTransport>;

impl GenericHandle {
    /// Create a new generic device handle
    pub fn new(d: impl Into<GenericTransport>) -> Self {
        Self::from(d.into())
    }
}
