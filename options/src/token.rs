use alloc::collections::{BTreeMap, BTreeSet};
use alloy_primitives::{Address, U256};

/// In-process balances of every ERC-20 style token the engine touches.
///
/// Balances are keyed by `(token, account)`. Tokens flagged with
/// [`TokenBook::set_fee_on_transfer`] burn 1% of every transfer, so a
/// recipient measuring its balance sees less than the sender sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenBook {
    balances: BTreeMap<(Address, Address), U256>,
    fee_on_transfer: BTreeSet<Address>,
}

impl TokenBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) {
        let balance = self.balance_of(token, to);
        self.balances.insert((token, to), balance.saturating_add(amount));
    }

    /// Moves `amount` of `token` from `from` to `to`.
    ///
    /// # Returns
    /// `false` if `from` holds less than `amount`, in which case nothing moves
    pub fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        let sender_balance = self.balance_of(token, from);

        if sender_balance < amount {
            return false;
        }

        let received = if self.fee_on_transfer.contains(&token) {
            amount - amount / U256::from(100)
        } else {
            amount
        };

        self.balances.insert((token, from), sender_balance - amount);
        let recipient_balance = self.balance_of(token, to);
        self.balances
            .insert((token, to), recipient_balance.saturating_add(received));
        true
    }

    #[must_use]
    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances
            .get(&(token, account))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn set_fee_on_transfer(&mut self, token: Address) {
        self.fee_on_transfer.insert(token);
    }
}
