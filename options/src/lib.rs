#![cfg_attr(not(test), no_std)]
//! Fully collateralized options over a token pair.
//!
//! A market is identified by an [`OptionKey`]. Depositing token0/token1
//! issues Long0/Long1 one-for-one plus a Short worth the combined deposit in
//! the base token. Before maturity longs, shorts and tokens can be exchanged
//! through [`OptionLedger::mint`], [`OptionLedger::burn`] and
//! [`OptionLedger::swap`]; after maturity shorts redeem whatever is left
//! through [`OptionLedger::collect`].
extern crate alloc;

pub mod callback;
pub mod error;
pub mod events;
pub mod key;
pub mod ledger;
pub mod params;
pub mod token;

pub use callback::NoCallback;
pub use error::OptionError;
pub use key::{OptionKey, PositionType};
pub use ledger::OptionLedger;
pub use params::CallContext;
pub use token::TokenBook;
