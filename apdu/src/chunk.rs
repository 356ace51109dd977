// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Frame chunking for payloads larger than a single APDU
//!
//! Both directions use the same split: payloads are cut into frames of at most
//! [`MAX_APDU_DATA`] bytes in order, with the final frame flagged as such.
//! Requests carry the flag in P2 ([`ChunkFlags::MORE`]), see [`tx`][crate::tx] for the
//! `SIGN_TX` layout.

use crate::{ApduError, MAX_APDU_DATA};

bitflags::bitflags! {
    /// Chunk flags, carried in P2 of chunked requests
    pub struct ChunkFlags: u8 {
        /// Further chunks follow this one
        const MORE = 0x80;
    }
}

impl ChunkFlags {
    /// Parse chunk flags from a raw P2 value, rejecting unknown bits
    pub fn from_p2(p2: u8) -> Result<Self, ApduError> {
        Self::from_bits(p2).ok_or(ApduError::InvalidEncoding)
    }

    /// Check whether this is the final chunk
    pub fn is_last(&self) -> bool {
        !self.contains(ChunkFlags::MORE)
    }
}

/// Single chunk of a larger payload
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Chunk<'a> {
    /// Index of this chunk within the payload
    pub index: usize,
    /// Chunk data
    pub data: &'a [u8],
    /// Whether more chunks follow
    pub more: bool,
}

impl<'a> Chunk<'a> {
    /// P2 flags for this chunk
    pub fn flags(&self) -> ChunkFlags {
        match self.more {
            true => ChunkFlags::MORE,
            false => ChunkFlags::empty(),
        }
    }
}

/// Iterator splitting a payload into [`Chunk`]s of at most `size` bytes
///
/// An empty payload yields a single empty final chunk.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    data: &'a [u8],
    size: usize,
    index: usize,
    done: bool,
}

impl<'a> Chunks<'a> {
    /// Split `data` into frames of the maximum APDU payload
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_size(data, MAX_APDU_DATA)
    }

    /// Split `data` into frames of `size` bytes (must be non-zero)
    pub fn with_size(data: &'a [u8], size: usize) -> Self {
        Self {
            data,
            size: size.clamp(1, MAX_APDU_DATA),
            index: 0,
            done: false,
        }
    }

    /// Number of chunks this payload will be split into
    pub fn count_chunks(&self) -> usize {
        match self.data.len() {
            0 => 1,
            n => (n + self.size - 1) / self.size,
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.index * self.size;
        let end = (offset + self.size).min(self.data.len());
        let more = end < self.data.len();

        let c = Chunk {
            index: self.index,
            data: &self.data[offset.min(end)..end],
            more,
        };

        self.index += 1;
        self.done = !more;

        Some(c)
    }
}
