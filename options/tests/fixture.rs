#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, U256};
use options::callback::OptionMintCallbackParam;
use options::params::{OptionMint, OptionMintParam};
use options::{CallContext, OptionError, OptionKey, OptionLedger, TokenBook};

pub const LEDGER: Address = Address::new([0x0E; 20]);
pub const TOKEN0: Address = Address::new([0x10; 20]);
pub const TOKEN1: Address = Address::new([0x20; 20]);
pub const ALICE: Address = Address::new([0xAA; 20]);
pub const BOB: Address = Address::new([0xBB; 20]);
pub const CAROL: Address = Address::new([0xCC; 20]);

pub const MATURITY: u64 = 1_000_000;
pub const NOW: u64 = 1_000;

pub fn strike_one() -> U256 {
    U256::from(1) << 128
}

pub fn key_with_strike(strike: U256) -> OptionKey {
    OptionKey::new(TOKEN0, TOKEN1, strike, U256::from(MATURITY))
}

pub fn one_to_one() -> OptionKey {
    key_with_strike(strike_one())
}

pub fn before_maturity(sender: Address) -> CallContext {
    CallContext::new(sender, NOW)
}

pub fn after_maturity(sender: Address) -> CallContext {
    CallContext::new(sender, MATURITY)
}

pub fn setup() -> (OptionLedger, TokenBook) {
    let mut tokens = TokenBook::new();
    for account in [ALICE, BOB, CAROL] {
        tokens.mint(TOKEN0, account, U256::from(1_000_000));
        tokens.mint(TOKEN1, account, U256::from(1_000_000));
    }
    (OptionLedger::new(LEDGER), tokens)
}

/// Settles a mint by paying exactly what the ledger asks for from `payer`.
pub fn pay_from(
    payer: Address,
) -> impl FnMut(&mut OptionLedger, &mut TokenBook, &OptionMintCallbackParam) -> Result<Bytes, OptionError>
{
    move |ledger, tokens, param| {
        tokens.transfer(TOKEN0, payer, ledger.address(), param.token0_and_long0_amount);
        tokens.transfer(TOKEN1, payer, ledger.address(), param.token1_and_long1_amount);
        Ok(param.data.clone())
    }
}

pub fn mint_to(owner: Address, key: OptionKey, amount0: u64, amount1: u64) -> OptionMintParam {
    OptionMintParam {
        key,
        long0_to: owner,
        long1_to: owner,
        short_to: owner,
        transaction: OptionMint::GivenTokensAndLongs,
        amount0: U256::from(amount0),
        amount1: U256::from(amount1),
        data: Bytes::new(),
    }
}
