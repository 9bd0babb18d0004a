use serde::{Deserialize, Serialize};

/// Asset balances at or below this are treated as fully liquidated.
pub const DUST_BALANCE: f64 = 0.00001;

/// Paper-trading ledger: cash, held units and the volume-weighted average
/// purchase price of those units. The cost basis is only meaningful while
/// `asset_balance > 0` and is reset to 0 when the position closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub cash_balance: f64,
    pub asset_balance: f64,
    pub average_cost_basis: f64,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash_balance: initial_cash,
            asset_balance: 0.0,
            average_cost_basis: 0.0,
        }
    }

    /// Holding means there are units on the book with a usable cost basis.
    pub fn is_holding(&self) -> bool {
        self.asset_balance > 0.0 && self.average_cost_basis > 0.0
    }

    /// Unrealized profit of the position relative to its cost basis.
    /// `None` while flat (no basis to divide by).
    pub fn profit_pct(&self, observed_price: f64) -> Option<f64> {
        if self.is_holding() {
            Some((observed_price - self.average_cost_basis) / self.average_cost_basis)
        } else {
            None
        }
    }

    /// Spend `spend` USD at `price`, recomputing the volume-weighted cost
    /// basis. Returns the post-trade snapshot. The caller guarantees
    /// `spend <= cash_balance`.
    pub fn apply_buy(&mut self, spend: f64, price: f64) -> Portfolio {
        debug_assert!(spend <= self.cash_balance + 1e-9);
        debug_assert!(price > 0.0);

        let bought = spend / price;
        let previously_flat = self.asset_balance <= 0.0;
        let held_cost = self.asset_balance * self.average_cost_basis;

        self.cash_balance -= spend;
        self.asset_balance += bought;
        self.average_cost_basis = if previously_flat {
            price
        } else {
            (held_cost + spend) / self.asset_balance
        };

        self.clone()
    }

    /// Liquidate up to `amount` units at `price`, crediting the proceeds.
    /// The sold amount is clamped so the balance never goes negative, and
    /// a remainder at or below [`DUST_BALANCE`] closes the position.
    pub fn apply_sell(&mut self, amount: f64, price: f64) -> Portfolio {
        debug_assert!(price > 0.0);

        let sold = amount.clamp(0.0, self.asset_balance);
        self.asset_balance -= sold;
        self.cash_balance += sold * price;

        if self.asset_balance <= DUST_BALANCE {
            self.asset_balance = 0.0;
            self.average_cost_basis = 0.0;
        }

        self.clone()
    }
}
