#![cfg_attr(not(test), no_std)]
//! A constant-product pool for option positions.
//!
//! Each market of the option ledger gets at most one pool, priced by a
//! square-root interest rate. Liquidity providers deposit long and short
//! positions through [`Pool::mint`]; traders exchange short for long
//! ([`Pool::leverage`]), long for short ([`Pool::deleverage`]) and Long0 for
//! Long1 ([`Pool::rebalance`]). Transaction fees and the short that decays
//! as maturity approaches accrue to liquidity providers pro rata.
extern crate alloc;

pub mod callback;
pub mod curve;
pub mod error;
pub mod events;
pub mod fee;
pub mod params;
pub mod position;
mod pool;
mod state;

pub use error::PoolError;
pub use crate::pool::Pool;
pub use state::PoolConfig;
