use std::{collections::BTreeMap, fmt};

use tracing::warn;
use wildlink_types::CurrencyBalance;

use crate::{Error, Result};

/// Currencies the client understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Currency {
    Stardust,
    Pokecoin,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Stardust, Currency::Pokecoin];

    /// Name used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Currency::Stardust => "STARDUST",
            Currency::Pokecoin => "POKECOIN",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|currency| currency.name() == name)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Balances keyed by currency, rebuilt from every profile snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CurrencyLedger {
    balances: BTreeMap<Currency, u64>,
}

impl CurrencyLedger {
    /// Build a ledger from server balances, dropping names the client does
    /// not know.
    pub fn from_balances(balances: &[CurrencyBalance]) -> Self {
        let mut ledger = Self::default();
        for balance in balances {
            if let Err(err) = ledger.record(&balance.name, balance.amount) {
                warn!(?err, amount = balance.amount, "skipping currency");
            }
        }
        ledger
    }

    /// Set the balance for `name`, overwriting any earlier entry.
    pub fn record(&mut self, name: &str, amount: u64) -> Result<Currency> {
        let currency =
            Currency::from_name(name).ok_or_else(|| Error::InvalidCurrencyKind(name.to_string()))?;
        self.balances.insert(currency, amount);
        Ok(currency)
    }

    pub fn get(&self, currency: Currency) -> Option<u64> {
        self.balances.get(&currency).copied()
    }

    /// Balance of `currency`, zero when the server sent none.
    pub fn balance(&self, currency: Currency) -> u64 {
        self.get(currency).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, u64)> + '_ {
        self.balances.iter().map(|(currency, amount)| (*currency, *amount))
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}
