// Copyright (c) 2022-2023 The MobileCoin Foundation

#![allow(dead_code)]

use std::str::FromStr;

use log::{debug, LevelFilter};
use simplelog::SimpleLogger;
use tokio::net::TcpListener;

use ledger_crab::{
    transport::{TcpOptions, TransportTcp},
    Emulator, SeedDriver,
};
use ledger_crab_core::engine::Config;
use ledger_crab_tests::MNEMONIC;

/// Setup logging, level from `LOG_LEVEL` (defaults to debug)
pub fn setup_logging() {
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());
}

/// Setup an emulator using the default test mnemonic
pub fn setup() -> Emulator {
    setup_with_config(Config::default())
}

/// Setup an emulator using the default test mnemonic and provided engine configuration
pub fn setup_with_config(cfg: Config) -> Emulator {
    setup_logging();

    Emulator::with_config(SeedDriver::from_mnemonic(MNEMONIC).unwrap(), cfg)
}

/// Setup an emulator served over TCP, returning the emulator and a connected transport
pub async fn setup_tcp() -> (Emulator, TransportTcp) {
    let e = setup();

    let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = l.local_addr().unwrap();

    debug!("Serving emulator on {}", addr);

    tokio::spawn(e.clone().serve(l));

    let t = TransportTcp::new(TcpOptions {
        addr: addr.ip(),
        port: addr.port(),
    })
    .await
    .unwrap();

    (e, t)
}
