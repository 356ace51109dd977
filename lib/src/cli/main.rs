// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Command line utility for interacting with the Crab hardware wallet app

use std::net::SocketAddr;

use clap::Parser;
use encdec::Encode;
use log::{debug, info, LevelFilter};
use tokio::net::TcpListener;

use ledger_crab_core::engine::Config;

use ledger_crab::{
    apdu::{tx::Transaction, DerivationPath},
    transport::{GenericTransport, TcpOptions, TransportTcp},
    signature_der, verify_signature, DeviceHandle, Emulator, Error, Exchange, SeedDriver, Target,
};

mod helpers;
use helpers::*;

/// Crab ledger command line utility
#[derive(Clone, PartialEq, Debug, Parser)]
struct Options {
    /// Device target
    #[clap(long, value_enum, default_value = "tcp")]
    target: Target,

    #[clap(flatten)]
    tcp: TcpOptions,

    /// BIP39 mnemonic for the emulated device
    #[clap(long, env = "CRAB_MNEMONIC")]
    mnemonic: Option<String>,

    /// Hide transaction memos in emulated device reviews
    #[clap(long)]
    hide_memo: bool,

    /// Timeout for user interactions (seconds)
    #[clap(long, default_value = "60")]
    user_timeout: usize,

    /// Subcommand to execute
    #[clap(subcommand)]
    cmd: Actions,

    /// Enable verbose logging
    #[clap(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: LevelFilter,
}

#[derive(Clone, PartialEq, Debug, Parser)]
#[non_exhaustive]
enum Actions {
    /// Fetch application info
    AppInfo,

    /// Fetch the public key and address for a derivation path
    PublicKey {
        /// BIP32 derivation path
        #[clap(long, value_parser = parse_path, default_value = "m/44'/535348'/0'")]
        path: DerivationPath,

        /// Display the address on the device for confirmation
        #[clap(long)]
        display: bool,
    },

    /// Sign a transaction
    SignTx {
        /// BIP32 derivation path
        #[clap(long, value_parser = parse_path, default_value = "m/44'/535348'/0'")]
        path: DerivationPath,

        /// Sender nonce
        #[clap(long, default_value = "0")]
        nonce: u64,

        /// Coin symbol
        #[clap(long, default_value = "CRAB")]
        coin: String,

        /// Value in base units
        #[clap(long)]
        value: u64,

        /// Hex-encoded recipient address
        #[clap(long)]
        to: HexData<20>,

        /// Transaction memo
        #[clap(long, default_value = "")]
        memo: String,
    },

    /// Serve an emulated device on a TCP APDU socket
    Serve {
        /// Listen address
        #[clap(long, default_value = "127.0.0.1:9999")]
        listen: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Options::parse();

    // Setup logging
    simplelog::SimpleLogger::init(args.log_level, simplelog::Config::default())?;

    // Serving an emulator does not require a device connection
    if let Actions::Serve { listen } = &args.cmd {
        let e = emulator(&args)?;

        info!("Serving emulator on {} (buttons via stdin)", listen);
        spawn_buttons(e.clone());

        let l = TcpListener::bind(listen).await?;
        e.serve(l).await?;

        return Ok(());
    }

    debug!("Using target: {}", args.target);

    // Connect to device
    let t: GenericTransport = match args.target {
        Target::Emulator => {
            let e = emulator(&args)?;
            spawn_buttons(e.clone());
            e.into()
        }
        Target::Tcp => TransportTcp::new(args.tcp.clone()).await?.into(),
        _ => return Err(anyhow::anyhow!("Unsupported target: {}", args.target)),
    };

    let d = DeviceHandle::from(t).with_user_timeout(args.user_timeout);

    // Execute command
    execute(d, args.cmd).await?;

    Ok(())
}

/// Setup an emulated device from the configured mnemonic
fn emulator(args: &Options) -> anyhow::Result<Emulator> {
    let m = args
        .mnemonic
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("--mnemonic or CRAB_MNEMONIC required for emulator"))?;

    let cfg = Config {
        show_memo: !args.hide_memo,
        ..Config::new()
    };

    Ok(Emulator::with_config(SeedDriver::from_mnemonic(m)?, cfg))
}

/// Execute a command with the provided transport
async fn execute<T>(t: DeviceHandle<T>, cmd: Actions) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    debug!("Executing command: {:?}", cmd);

    match cmd {
        Actions::AppInfo => {
            let i = t.app_info().await?;

            info!("app info: {:#?}", i);
        }
        Actions::PublicKey { path, display } => {
            info!("requesting public key for path: {}", path);

            let k = t.public_key(&path, display).await?;

            info!("public key: {}", hex::encode(k.public_key));
            info!("chain code: {}", hex::encode(k.chain_code));
            info!("address:    0x{}", hex::encode(k.address));
        }
        Actions::SignTx {
            path,
            nonce,
            coin,
            value,
            to,
            memo,
        } => {
            let tx = Transaction::new(nonce, &coin, value, to.0, &memo).map_err(Error::from)?;

            let mut buff = vec![0u8; tx.encode_len().map_err(Error::from)?];
            tx.encode(&mut buff).map_err(Error::from)?;

            debug!("Encoded transaction: {}", hex::encode(&buff));

            // Fetch the signing key for verification
            let k = t.public_key(&path, false).await?;

            info!("Signing {} {} to {} (nonce: {})", value, coin, to, nonce);
            info!("Review and approve the transaction on the device");

            let sig = t.sign_tx(&path, &buff).await?;

            verify_signature(&k.public_key, &buff, &sig)?;

            info!("signature: {}", hex::encode(sig.signature));
            info!("v: {}", sig.v);
            info!("der: {}", hex::encode(signature_der(&sig)?));
        }
        Actions::Serve { .. } => {
            return Err(anyhow::anyhow!("serve does not use a device connection"));
        }
    }

    Ok(())
}
