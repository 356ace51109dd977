// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Generic transport abstraction for hiding underlying transport types
//!
//! The TCP transport speaks the speculos APDU framing: requests are prefixed with
//! a big-endian `u32` length, responses carry a big-endian `u32` payload length
//! followed by the payload and the two byte status word.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use async_trait::async_trait;
use log::{debug, trace};
use strum::Display;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};

use ledger_crab_apdu::{APDU_HEADER_LEN, MAX_APDU_DATA};
use ledger_crab_core::consts::MAX_RESP_LEN;

use crate::{Emulator, Error, Exchange};

/// Default speculos APDU port
pub const DEFAULT_TCP_PORT: u16 = 9999;

/// TCP transport options
#[derive(Clone, PartialEq, Debug, clap::Args)]
pub struct TcpOptions {
    /// Speculos APDU socket address
    #[clap(long = "tcp-addr", default_value = "127.0.0.1", env = "CRAB_TCP_ADDR")]
    pub addr: IpAddr,

    /// Speculos APDU socket port
    #[clap(long = "tcp-port", default_value_t = DEFAULT_TCP_PORT, env = "CRAB_TCP_PORT")]
    pub port: u16,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_TCP_PORT,
        }
    }
}

/// TCP transport for speculos (or [Emulator::serve]) APDU sockets
pub struct TransportTcp {
    s: TcpStream,
}

impl TransportTcp {
    /// Connect to a TCP APDU socket
    pub async fn new(opts: TcpOptions) -> Result<Self, Error> {
        debug!("Connecting to {}:{}", opts.addr, opts.port);

        let s = TcpStream::connect((opts.addr, opts.port)).await?;

        Ok(Self { s })
    }
}

#[async_trait]
impl Exchange for TransportTcp {
    async fn exchange(&mut self, command: &[u8], timeout: Duration) -> Result<Vec<u8>, Error> {
        trace!("TX: {:02x?}", command);

        write_frame(&mut self.s, command).await?;

        let resp = tokio::time::timeout(timeout, read_response(&mut self.s)).await??;

        trace!("RX: {:02x?}", resp);

        Ok(resp)
    }
}

/// Write a length-prefixed request frame
pub(crate) async fn write_frame<S: AsyncWrite + Unpin>(
    s: &mut S,
    data: &[u8],
) -> Result<(), Error> {
    s.write_all(&(data.len() as u32).to_be_bytes()).await?;
    s.write_all(data).await?;
    s.flush().await?;
    Ok(())
}

/// Read a length-prefixed request frame, `None` on a clean disconnect
pub(crate) async fn read_frame<S: AsyncRead + Unpin>(s: &mut S) -> Result<Option<Vec<u8>>, Error> {
    let mut h = [0u8; 4];
    match s.read_exact(&mut h).await {
        Ok(_) => (),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let n = u32::from_be_bytes(h) as usize;
    if n > APDU_HEADER_LEN + MAX_APDU_DATA {
        return Err(Error::UnexpectedResponse);
    }

    let mut b = vec![0u8; n];
    s.read_exact(&mut b).await?;

    Ok(Some(b))
}

/// Write a response (payload and status word), prefixed with the payload length
pub(crate) async fn write_response<S: AsyncWrite + Unpin>(
    s: &mut S,
    resp: &[u8],
) -> Result<(), Error> {
    let n = resp.len().checked_sub(2).ok_or(Error::UnexpectedResponse)?;

    s.write_all(&(n as u32).to_be_bytes()).await?;
    s.write_all(resp).await?;
    s.flush().await?;
    Ok(())
}

/// Read a response, returning the payload with the trailing status word
async fn read_response<S: AsyncRead + Unpin>(s: &mut S) -> Result<Vec<u8>, Error> {
    let mut h = [0u8; 4];
    s.read_exact(&mut h).await?;

    let n = u32::from_be_bytes(h) as usize;
    if n > MAX_RESP_LEN {
        return Err(Error::UnexpectedResponse);
    }

    let mut b = vec![0u8; n + 2];
    s.read_exact(&mut b).await?;

    Ok(b)
}

/// Generic ledger device (abstract over transport types)
#[derive(Display)]
#[non_exhaustive]
pub enum GenericTransport {
    Emulator(Emulator),
    #[cfg(feature = "transport_tcp")]
    Tcp(TransportTcp),
}

/// Convert an emulator into a generic transport
impl From<Emulator> for GenericTransport {
    fn from(e: Emulator) -> Self {
        Self::Emulator(e)
    }
}

/// Convert a TCP transport into a generic transport
#[cfg(feature = "transport_tcp")]
impl From<TransportTcp> for GenericTransport {
    fn from(t: TransportTcp) -> Self {
        Self::Tcp(t)
    }
}

/// Implementation of [Exchange] for [GenericTransport]
#[async_trait]
impl Exchange for GenericTransport {
    async fn exchange(&mut self, command: &[u8], timeout: Duration) -> Result<Vec<u8>, Error> {
        match self {
            Self::Emulator(e) => e.exchange(command, timeout).await,
            #[cfg(feature = "transport_tcp")]
            Self::Tcp(t) => t.exchange(command, timeout).await,
        }
    }
}
