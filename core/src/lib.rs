// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Crab hardware wallet core
//!
//! This provides a common [Engine][engine] supporting public key export and transaction
//! signing for execution on hardware wallets, along with a [Dispatcher][dispatcher::Dispatcher]
//! mapping raw APDUs to engine operations and a [Reviewer][review::Reviewer] driving
//! on-screen approval.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and
//! [Output][engine::Output]s, see [ledger_crab_apdu] for APDU objects and wire encodings.
//!
//! ## Operations
//!
//! Prior to interacting with a hardware wallet the client may issue
//! [`VersionReq`][ledger_crab_apdu::app_info::VersionReq] and
//! [`AppNameReq`][ledger_crab_apdu::app_info::AppNameReq] to check the running application.
//!
//! ### Requesting public keys
//!
//! Public keys can be requested via [`PublicKeyReq`][ledger_crab_apdu::public_key::PublicKeyReq],
//! returning a [`PublicKeyResp`][ledger_crab_apdu::public_key::PublicKeyResp] containing
//! the compressed public key, chain code and address for the requested path.
//! With P1 set to [`PublicKeyMode::Display`][ledger_crab_apdu::public_key::PublicKeyMode::Display]
//! the response is held until the user confirms the address on-screen.
//!
//! ### Signing a transaction
//!
//! 1. Issue `SIGN_TX` chunk 0 containing the derivation path for the signing key
//! 2. Issue `SIGN_TX` chunks 1..N containing the encoded
//!    [`Transaction`][ledger_crab_apdu::tx::Transaction], with P2 flagging all but the last
//! 3. The final chunk opens a review, the response is returned once the user approves
//!    ([`SignTxResp`][ledger_crab_apdu::tx::SignTxResp]) or rejects
//!    ([`StatusWord::Deny`][ledger_crab_apdu::StatusWord::Deny]) the transaction,
//!    or the review times out.
//!

#![cfg_attr(not(feature = "std"), no_std)]

pub use ledger_crab_apdu::{self as apdu};

pub mod consts;

pub mod engine;

pub mod dispatcher;

pub mod review;

pub mod helpers;
