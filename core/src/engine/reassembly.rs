// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Reassembly of chunked request payloads
//!
//! Chunks must arrive in order for a single instruction, a request is
//! complete once a chunk without [`ChunkFlags::MORE`][ledger_crab_apdu::chunk::ChunkFlags::MORE]
//! is received. Sequencing errors abort the in-flight request.

use heapless::Vec;

use super::Error;

/// Reassembly progress
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Progress {
    /// Further chunks required
    More,
    /// Final chunk received
    Complete,
}

/// Fixed capacity chunk reassembly buffer
#[derive(Clone, Debug)]
pub struct Reassembler<const N: usize> {
    buff: Vec<u8, N>,
    ins: u8,
    next: u8,
    active: bool,
}

impl<const N: usize> Default for Reassembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Reassembler<N> {
    /// Create a new (inactive) reassembler
    pub const fn new() -> Self {
        Self {
            buff: Vec::new(),
            ins: 0,
            next: 0,
            active: false,
        }
    }

    /// Start reassembly for instruction `ins`, expecting chunk `first` next
    pub fn start(&mut self, ins: u8, first: u8) {
        self.buff.clear();
        self.ins = ins;
        self.next = first;
        self.active = true;
    }

    /// Check whether a reassembly is in progress
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append a chunk
    ///
    /// Chunks for a different instruction, out-of-order indices and pushes after
    /// completion fail with [`Error::Transport`]. Payloads exceeding the buffer
    /// fail with [`Error::TxTooLong`]. Both abort the reassembly.
    pub fn push(&mut self, ins: u8, index: u8, more: bool, data: &[u8]) -> Result<Progress, Error> {
        if !self.active || ins != self.ins || index != self.next {
            #[cfg(feature = "log")]
            log::warn!(
                "unexpected chunk (ins: {:02x} index: {}), expected (ins: {:02x} index: {})",
                ins,
                index,
                self.ins,
                self.next
            );

            self.clear();
            return Err(Error::Transport);
        }

        if self.buff.extend_from_slice(data).is_err() {
            self.clear();
            return Err(Error::TxTooLong);
        }

        if !more {
            self.active = false;
            return Ok(Progress::Complete);
        }

        // Chunk indices are a single byte
        match self.next.checked_add(1) {
            Some(n) => self.next = n,
            None => {
                self.clear();
                return Err(Error::TxTooLong);
            }
        }

        Ok(Progress::More)
    }

    /// Fetch reassembled data
    pub fn data(&self) -> &[u8] {
        &self.buff
    }

    /// Number of bytes received
    pub fn len(&self) -> usize {
        self.buff.len()
    }

    /// Check whether any data has been received
    pub fn is_empty(&self) -> bool {
        self.buff.is_empty()
    }

    /// Reset reassembly state
    pub fn clear(&mut self) {
        self.buff.clear();
        self.ins = 0;
        self.next = 0;
        self.active = false;
    }
}
