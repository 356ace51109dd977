// Copyright (c) 2022-2023 The MobileCoin Foundation

//! On-screen review navigation
//!
//! The [Reviewer] pages through a pending [Review] in response to button events,
//! exiting with the user's decision once both buttons are pressed on the
//! approve or reject page.

use core::fmt::{self, Write};

use crate::{
    engine::Review,
    helpers::{fmt_address, fmt_value},
};

/// Button events
#[derive(Copy, Clone, Debug, PartialEq, strum::Display, strum::EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Button {
    Left,
    Right,
    Both,
}

/// Result type for Ui elements
///
/// Indicates whether a redraw is required or if the element has
/// been exited returning a value, for example, a bool on approve / reject.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UiResult<R = ()> {
    /// None indicates no change
    None,
    /// Update indicates UI should be redrawn
    Update,
    /// Exit used to signal element exit
    Exit(R),
}

impl<R> UiResult<R> {
    /// Map on UiResult exit value
    pub fn map_exit<O>(&self, mut f: impl FnMut(&R) -> O) -> UiResult<O> {
        match self {
            UiResult::None => UiResult::None,
            UiResult::Update => UiResult::Update,
            UiResult::Exit(ref v) => {
                let o = f(v);
                UiResult::Exit(o)
            }
        }
    }

    /// Check if a UiResult is the `Exit` variant
    pub fn is_exit(&self) -> bool {
        matches!(self, UiResult::Exit(..))
    }
}

/// Review pages
#[derive(Copy, Clone, Debug, PartialEq, strum::Display)]
pub enum Page {
    Intro,
    Amount,
    Recipient,
    Memo,
    Address,
    Approve,
    Reject,
}

const TX_PAGES: &[Page] = &[
    Page::Intro,
    Page::Amount,
    Page::Recipient,
    Page::Memo,
    Page::Approve,
    Page::Reject,
];

const TX_PAGES_NO_MEMO: &[Page] = &[
    Page::Intro,
    Page::Amount,
    Page::Recipient,
    Page::Approve,
    Page::Reject,
];

const ADDRESS_PAGES: &[Page] = &[Page::Intro, Page::Address, Page::Approve, Page::Reject];

/// Review navigation element
///
/// Right moves forward, left moves back (clamped at either end), both buttons
/// on the approve / reject pages exit with the decision.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Reviewer {
    pages: &'static [Page],
    index: usize,
}

impl Reviewer {
    /// Create a new [Reviewer] for the provided review
    pub fn new(review: &Review) -> Self {
        let pages = match review {
            Review::Transaction { show_memo: true, .. } => TX_PAGES,
            Review::Transaction { .. } => TX_PAGES_NO_MEMO,
            Review::Address { .. } => ADDRESS_PAGES,
        };

        Self { pages, index: 0 }
    }

    /// Fetch the current page
    pub fn page(&self) -> Page {
        self.pages[self.index]
    }

    /// Update [Reviewer] state, handling button events and returning the
    /// approval state on exit
    pub fn update(&mut self, btn: Button) -> UiResult<bool> {
        match (self.page(), btn) {
            (Page::Approve, Button::Both) => UiResult::Exit(true),
            (Page::Reject, Button::Both) => UiResult::Exit(false),
            (_, Button::Right) if self.index + 1 < self.pages.len() => {
                self.index += 1;
                UiResult::Update
            }
            (_, Button::Left) if self.index > 0 => {
                self.index -= 1;
                UiResult::Update
            }
            _ => UiResult::None,
        }
    }

    /// Render the current page as text
    pub fn render<W: Write>(&self, review: &Review, w: &mut W) -> fmt::Result {
        let mut buff = [0u8; 64];

        match (self.page(), review) {
            (Page::Intro, Review::Transaction { .. }) => write!(w, "Review transaction"),
            (Page::Intro, Review::Address { .. }) => write!(w, "Verify address"),
            (Page::Amount, Review::Transaction { tx, .. }) => {
                write!(w, "Amount\n{}", fmt_value(tx.value, tx.coin, &mut buff))
            }
            (Page::Recipient, Review::Transaction { tx, .. }) => {
                write!(w, "To\n{}", fmt_address(&tx.to, &mut buff))
            }
            (Page::Memo, Review::Transaction { tx, .. }) => write!(w, "Memo\n{}", tx.memo),
            (Page::Address, Review::Address { path, address }) => {
                write!(w, "Address {}\n{}", path, fmt_address(address, &mut buff))
            }
            (Page::Approve, Review::Transaction { .. }) => write!(w, "Sign transaction"),
            (Page::Approve, Review::Address { .. }) => write!(w, "Approve"),
            (Page::Reject, _) => write!(w, "Reject"),
            _ => Ok(()),
        }
    }
}
