// Copyright (c) 2022-2023 The MobileCoin Foundation

use clap::Parser;
use log::{debug, info, LevelFilter};
use strum::{Display, EnumString, EnumVariantNames};

use ledger_crab::{
    apdu::DerivationPath,
    transport::{TcpOptions, TransportTcp},
    Emulator, Exchange, SeedDriver, Target,
};
use ledger_crab_tests::*;

/// Test CLI arguments
#[derive(Clone, Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub test: Tests,

    /// Target for test execution
    #[clap(long, value_enum, default_value = "tcp", env)]
    pub target: Target,

    #[clap(flatten)]
    pub tcp: TcpOptions,

    /// bip39 Mnemonic (must be shared between test util and target)
    #[clap(long, env, default_value = MNEMONIC)]
    pub mnemonic: String,

    /// Log level
    #[clap(long, default_value = "debug", env)]
    pub log_level: LevelFilter,

    /// Enable logging for transports
    #[clap(long)]
    pub log_transports: bool,
}

/// Test modes
#[derive(Clone, PartialEq, Debug, Parser, Display, EnumString, EnumVariantNames)]
pub enum Tests {
    /// Test application info
    AppInfo,
    /// Test public key derivation and address display
    PublicKey {
        /// Account index
        #[clap(long, default_value = "0")]
        account: u32,
    },
    /// Test transaction signing
    Tx {
        /// Transaction expectation index
        #[clap(long, default_value = "0")]
        index: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load command line options
    let opts = Opts::parse();

    // Setup logging
    let mut c = simplelog::ConfigBuilder::new();
    if !opts.log_transports {
        c.add_filter_ignore_str("ledger_crab::transport");
    }

    let _ = simplelog::SimpleLogger::init(opts.log_level, c.build());

    debug!("options: {:?}", opts);

    info!("Running test '{}` via {}", opts.test, opts.target);

    // Connect to target and execute test
    match opts.target {
        Target::Emulator => {
            let e = Emulator::new(SeedDriver::from_mnemonic(&opts.mnemonic)?);
            let ui = e.clone();

            execute(e, |approve| emulator_review(&ui, approve), &opts).await?;
        }
        #[cfg(feature = "transport_tcp")]
        Target::Tcp => {
            let t = TransportTcp::new(opts.tcp.clone()).await?;

            let review = |approve: bool| async move {
                info!(
                    "Please {} on the device",
                    if approve { "approve" } else { "reject" }
                );
            };

            execute(t, review, &opts).await?;
        }
        #[allow(unreachable_patterns)]
        _ => {
            return Err(anyhow::anyhow!(
                "transport: {} feature not enabled",
                opts.target
            ));
        }
    };

    log::info!("Test OK!");

    Ok(())
}

/// Execute a test with the provided transport
async fn execute<T, F>(
    target: T,
    review: impl Fn(bool) -> F,
    opts: &Opts,
) -> anyhow::Result<()>
where
    T: Exchange + Send,
    F: std::future::Future<Output = ()>,
{
    match &opts.test {
        Tests::AppInfo => app_info::test(target).await?,
        Tests::PublicKey { account } => {
            let path = DerivationPath::account(*account).map_err(ledger_crab::Error::from)?;
            public_key::test(target, review, &opts.mnemonic, &path).await?
        }
        Tests::Tx { index } => {
            let tx = transaction::TRANSACTIONS
                .get(*index)
                .ok_or_else(|| anyhow::anyhow!("unknown transaction index: {}", index))?;

            transaction::test(target, review, tx).await?
        }
    }

    Ok(())
}
