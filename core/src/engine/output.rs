// Copyright (c) 2022-2023 The MobileCoin Foundation

use encdec::Encode;

use ledger_crab_apdu::{
    public_key::{ADDRESS_LEN, CHAIN_CODE_LEN, PUBLIC_KEY_LEN},
    tx::SIGNATURE_LEN,
    ApduError,
};

use crate::apdu;

/// [`Engine`][super::Engine] outputs (in response to events), typically encoded
/// to response [APDUs][crate::apdu]
#[derive(Clone, PartialEq, Debug)]
pub enum Output {
    None,

    /// Application version
    Version { major: u8, minor: u8, patch: u8 },

    /// Application name
    AppName { name: &'static str },

    /// Public key, chain code and address
    PublicKey {
        public_key: [u8; PUBLIC_KEY_LEN],
        chain_code: [u8; CHAIN_CODE_LEN],
        address: [u8; ADDRESS_LEN],
    },

    /// Transaction signature
    Signature {
        signature: [u8; SIGNATURE_LEN],
        v: u8,
    },

    /// Indicate the device is waiting for user input
    Pending,
}

impl Output {
    /// Encode an [`Output`] object to a response [APDU]
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            Output::None | Output::Pending => Ok(0),
            Output::Version {
                major,
                minor,
                patch,
            } => apdu::app_info::VersionResp::new(*major, *minor, *patch).encode(buff),
            Output::AppName { name } => apdu::app_info::AppNameResp::new(name).encode(buff),
            Output::PublicKey {
                public_key,
                chain_code,
                address,
            } => apdu::public_key::PublicKeyResp::new(*public_key, *chain_code, *address)
                .encode(buff),
            Output::Signature { signature, v } => {
                apdu::tx::SignTxResp::new(*signature, *v).encode(buff)
            }
        }
    }

    /// Check whether this output defers the response pending user input
    pub fn is_pending(&self) -> bool {
        matches!(self, Output::Pending)
    }
}
