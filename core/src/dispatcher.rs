// Copyright (c) 2022-2023 The MobileCoin Foundation

//! APDU command dispatcher
//!
//! Maps raw request frames to [Engine] events and encodes the resulting outputs
//! (or errors) to response frames (`[data][SW1 SW2]`). Requests opening a user
//! review resolve to [`Reply::Pending`], the deferred response is produced once
//! the review is resolved via [`Dispatcher::confirm`] or [`Dispatcher::tick`].

use ledger_crab_apdu::{ApduHeader, StatusWord, CRAB_APDU_CLA};

use crate::engine::{Driver, Engine, Error, Event, Output};

/// Encoded response
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Response {
    /// Response status
    pub status: StatusWord,
    /// Response length, including the trailing status word
    pub len: usize,
}

/// Dispatcher reply to a request frame
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Reply {
    /// Response ready for transmission
    Ready(Response),
    /// Response deferred pending user input
    Pending,
}

/// Command dispatcher, owns the [Engine] for a single device
pub struct Dispatcher<DRV: Driver> {
    engine: Engine<DRV>,
}

impl<DRV: Driver> Dispatcher<DRV> {
    /// Create a new dispatcher for the provided engine
    pub const fn new(engine: Engine<DRV>) -> Self {
        Self { engine }
    }

    /// Handle a raw request frame, writing any response to `buff`
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn handle(&mut self, apdu: &[u8], buff: &mut [u8]) -> Reply {
        let (header, data) = match ApduHeader::parse(apdu) {
            Ok(v) => v,
            Err(_) => return Reply::Ready(respond(Err(Error::InvalidLength), buff)),
        };

        if header.cla != CRAB_APDU_CLA {
            return Reply::Ready(respond(Err(Error::UnknownClass), buff));
        }

        let evt = match Event::parse(&header, data) {
            Ok(v) => v,
            Err(e) => return Reply::Ready(respond(Err(e), buff)),
        };

        match self.engine.update(&evt) {
            Ok(Output::Pending) => Reply::Pending,
            r => Reply::Ready(respond(r, buff)),
        }
    }

    /// Resolve a pending review, returning the deferred response
    pub fn confirm(&mut self, approve: bool, buff: &mut [u8]) -> Option<Response> {
        if !self.engine.is_pending() {
            return None;
        }

        let r = match approve {
            true => self.engine.approve(),
            false => self.engine.deny(),
        };

        Some(respond(r, buff))
    }

    /// Platform tick, returns the deferred response if a pending review timed out
    pub fn tick(&mut self, buff: &mut [u8]) -> Option<Response> {
        self.engine.tick().map(|r| respond(r, buff))
    }

    /// Fetch the underlying engine
    pub fn engine(&self) -> &Engine<DRV> {
        &self.engine
    }

    /// Fetch the underlying engine (mutably)
    pub fn engine_mut(&mut self) -> &mut Engine<DRV> {
        &mut self.engine
    }
}

/// Encode an engine result to a response frame
fn respond(r: Result<Output, Error>, buff: &mut [u8]) -> Response {
    let body = buff.len().saturating_sub(2);

    let (status, n) = match r {
        Ok(o) => match o.encode(&mut buff[..body]) {
            Ok(n) => (StatusWord::Ok, n),
            Err(_e) => {
                #[cfg(feature = "log")]
                log::error!("response encoding failed: {:?}", _e);

                (Error::EncodingFailed.status(), 0)
            }
        },
        Err(e) => {
            #[cfg(feature = "log")]
            log::warn!("request failed: {} (sw: {:04x})", e as u8, e.status().code());

            (e.status(), 0)
        }
    };

    if buff.len() < n + 2 {
        return Response { status, len: 0 };
    }

    let len = n + status.encode(&mut buff[n..]);

    Response { status, len }
}
