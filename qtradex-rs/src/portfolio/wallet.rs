//! Wallet balances for a single asset/currency pair

use serde::{Deserialize, Serialize};

/// Asset and currency balances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Units of the traded asset (e.g. BTC)
    pub assets: f64,
    /// Units of the quote currency (e.g. USDT)
    pub currency: f64,
}

/// Result of a simulated fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    /// Asset units bought or sold
    pub quantity: f64,
    /// Currency spent or received
    pub cost: f64,
    /// Fee paid in currency
    pub fee: f64,
}

impl Wallet {
    /// Create new wallet
    pub fn new(assets: f64, currency: f64) -> Self {
        Self { assets, currency }
    }

    /// Mark-to-market value in currency
    pub fn value(&self, price: f64) -> f64 {
        self.currency + self.assets * price
    }

    /// Spend `amount` currency on assets at `price`, paying `fee_rate` of the amount.
    ///
    /// Returns `None` if nothing could be bought.
    pub fn buy(&mut self, amount: f64, price: f64, fee_rate: f64) -> Option<Fill> {
        let amount = amount.min(self.currency);
        if amount <= 0.0 || price <= 0.0 {
            return None;
        }
        let fee = amount * fee_rate;
        let quantity = (amount - fee) / price;
        self.currency -= amount;
        self.assets += quantity;
        Some(Fill {
            quantity,
            cost: amount,
            fee,
        })
    }

    /// Sell every asset unit at `price`, paying `fee_rate` of the proceeds.
    ///
    /// Returns `None` if the wallet holds no assets.
    pub fn sell_all(&mut self, price: f64, fee_rate: f64) -> Option<Fill> {
        if self.assets <= 0.0 || price <= 0.0 {
            return None;
        }
        let quantity = self.assets;
        let gross = quantity * price;
        let fee = gross * fee_rate;
        self.assets = 0.0;
        self.currency += gross - fee;
        Some(Fill {
            quantity,
            cost: gross - fee,
            fee,
        })
    }

    pub fn has_assets(&self) -> bool {
        self.assets > 0.0
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(0.0, 1000.0)
    }
}
