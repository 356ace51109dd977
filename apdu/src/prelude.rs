// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    app_info::{AppNameReq, AppNameResp, VersionReq, VersionResp},
    chunk::{Chunk, ChunkFlags, Chunks},
    path::{DerivationPath, PathError, HARDENED},
    public_key::{PublicKeyMode, PublicKeyReq, PublicKeyResp},
    status::StatusWord,
    tx::{SignTx, SignTxResp, Transaction, TxProgress},
    ApduHeader, Instruction,
};
