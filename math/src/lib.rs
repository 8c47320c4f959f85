#![cfg_attr(not(test), no_std)]
//! Pure arithmetic shared by the option ledger and the pool engine.
//!
//! Everything here is stateless. Rounding is never implicit: every function
//! that can lose precision takes an explicit `round_up` flag so the caller
//! decides who keeps the remainder.
extern crate alloc;

pub mod error;
pub mod full_math;
pub mod num;
pub mod safe_cast;
pub mod strike;

pub use error::MathError;
