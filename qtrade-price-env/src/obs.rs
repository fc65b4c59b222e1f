//! Observations of [`PriceEnv`](crate::PriceEnv) and their encoding.
use qtrade_core::{Encoder, Obs};
use serde::{Deserialize, Serialize};

/// State of the account and of the market at a time step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TradeState {
    /// Quantity of the asset held.
    pub holdings: f32,

    /// Cash available.
    pub cash: f32,

    /// Current price.
    pub price: f32,

    /// Price at the next step.
    pub next_price: f32,
}

impl Obs for TradeState {}

impl TradeState {
    /// Returns the value of the account at the current price.
    pub fn net_worth(&self) -> f32 {
        self.cash + self.holdings * self.price
    }
}

/// Encodes [`TradeState`] into 4 features.
///
/// Holdings, cash and prices are divided by their own scale, so that features of
/// a typical episode lie around unity.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TradeStateEncoder {
    /// Scale of the holdings.
    pub holdings_scale: f32,

    /// Scale of the cash.
    pub cash_scale: f32,

    /// Scale of the current and next prices.
    pub price_scale: f32,
}

impl Default for TradeStateEncoder {
    fn default() -> Self {
        Self {
            holdings_scale: 1.0,
            cash_scale: 1.0,
            price_scale: 1.0,
        }
    }
}

impl TradeStateEncoder {
    /// Constructs an encoder with the given scales.
    pub fn new(holdings_scale: f32, cash_scale: f32, price_scale: f32) -> Self {
        Self {
            holdings_scale,
            cash_scale,
            price_scale,
        }
    }

    /// Scales cash by the initial cash and prices by the highest price.
    ///
    /// Holdings are scaled by the quantity affordable with the initial cash at the
    /// highest price.
    pub fn for_series(prices: &[f32], initial_cash: f32) -> Self {
        let price_scale = prices.iter().copied().fold(f32::MIN_POSITIVE, f32::max);
        let cash_scale = initial_cash.max(f32::MIN_POSITIVE);
        Self::new((cash_scale / price_scale).max(1.0), cash_scale, price_scale)
    }
}

impl Encoder<TradeState> for TradeStateEncoder {
    fn dim(&self) -> usize {
        4
    }

    fn encode_into(&self, obs: &TradeState, buf: &mut Vec<f32>) {
        buf.extend([
            obs.holdings / self.holdings_scale,
            obs.cash / self.cash_scale,
            obs.price / self.price_scale,
            obs.next_price / self.price_scale,
        ]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TradeState {
        TradeState {
            holdings: 2.0,
            cash: 500.0,
            price: 20.0,
            next_price: 25.0,
        }
    }

    #[test]
    fn test_net_worth() {
        assert_eq!(state().net_worth(), 540.0);
    }

    #[test]
    fn test_encode() {
        let encoder = TradeStateEncoder::new(4.0, 1000.0, 50.0);
        let mut buf = vec![];
        encoder.encode_into(&state(), &mut buf);
        assert_eq!(buf, vec![0.5, 0.5, 0.4, 0.5]);

        let batch = encoder.encode_batch([Some(&state()), None]);
        assert_eq!(batch.len(), 2 * encoder.dim());
        assert!(batch[4..].iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_for_series() {
        let encoder = TradeStateEncoder::for_series(&[10.0, 40.0, 20.0], 1000.0);
        assert_eq!(encoder.price_scale, 40.0);
        assert_eq!(encoder.cash_scale, 1000.0);
        assert_eq!(encoder.holdings_scale, 25.0);
    }
}
