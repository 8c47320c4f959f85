#![cfg_attr(not(test), no_std)]
//! Helpers for talking to the option ledger and the pool.
//!
//! [`Quoter`] previews any operation without touching the real state and
//! [`Payer`] is a ready-made account that settles every callback from its
//! own balances, splitting long requirements by a [`LongSplit`].
extern crate alloc;

pub mod payer;
pub mod quoter;
pub mod split;

pub use payer::Payer;
pub use quoter::{PoolQuote, Quoter};
pub use split::LongSplit;
