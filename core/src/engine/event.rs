// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::DecodeOwned;

use ledger_crab_apdu::{prelude::*, tx::PATH_CHUNK};

use super::Error;

/// [`Engine`][super::Engine] input events, typically decoded from request [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Event<'a> {
    None,

    /// Fetch application version
    GetVersion,

    /// Fetch application name
    GetAppName,

    /// Fetch a public key, optionally confirming the address on-screen
    GetPublicKey {
        path: DerivationPath,
        mode: PublicKeyMode,
    },

    /// Start a transaction signing session (chunk 0)
    TxStart { path: DerivationPath },

    /// Transaction data chunk (chunks 1..N)
    TxChunk {
        index: u8,
        more: bool,
        data: &'a [u8],
    },
}

impl<'a> Event<'a> {
    /// Parse an incoming APDU to engine event
    ///
    /// `CLA` is expected to have been checked by the caller.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn parse(header: &ApduHeader, buff: &'a [u8]) -> Result<Self, Error> {
        let ins = Instruction::try_from(header.ins).map_err(|_| Error::UnknownInstruction)?;

        match ins {
            Instruction::GetVersion | Instruction::GetAppName => {
                if header.p1 != 0 || header.p2 != 0 {
                    return Err(Error::Transport);
                }

                match ins {
                    Instruction::GetVersion => Ok(Event::GetVersion),
                    _ => Ok(Event::GetAppName),
                }
            }
            Instruction::GetPublicKey => {
                let mode = PublicKeyMode::try_from(header.p1).map_err(|_| Error::Transport)?;
                if header.p2 != 0 {
                    return Err(Error::Transport);
                }

                let path = parse_path(buff)?;

                Ok(Event::GetPublicKey { path, mode })
            }
            Instruction::SignTx => {
                let flags = ChunkFlags::from_p2(header.p2).map_err(|_| Error::Transport)?;
                let more = !flags.is_last();

                if header.p1 == PATH_CHUNK {
                    // The path chunk is always followed by transaction data
                    if !more {
                        return Err(Error::Transport);
                    }

                    let path = parse_path(buff)?;

                    return Ok(Event::TxStart { path });
                }

                Ok(Event::TxChunk {
                    index: header.p1,
                    more,
                    data: buff,
                })
            }
        }
    }
}

/// Decode a derivation path, rejecting trailing bytes
fn parse_path(buff: &[u8]) -> Result<DerivationPath, Error> {
    match DerivationPath::decode_owned(buff) {
        Ok((p, n)) if n == buff.len() => Ok(p),
        _ => Err(Error::InvalidPath),
    }
}
