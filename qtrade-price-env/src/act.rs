//! Actions of [`PriceEnv`](crate::PriceEnv).
use qtrade_core::Act;

/// Action on the asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeAct {
    /// Do nothing.
    Hold,

    /// Buy a fixed quantity at the current price.
    Buy,

    /// Sell a fixed quantity at the current price.
    Sell,
}

impl Act for TradeAct {
    fn n_actions() -> usize {
        3
    }

    /// Indices out of range fall back to [`TradeAct::Hold`].
    fn from_index(ix: usize) -> Self {
        match ix {
            1 => Self::Buy,
            2 => Self::Sell,
            _ => Self::Hold,
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Hold => 0,
            Self::Buy => 1,
            Self::Sell => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index() {
        for ix in 0..TradeAct::n_actions() {
            assert_eq!(TradeAct::from_index(ix).index(), ix);
        }
        assert_eq!(TradeAct::from_index(1), TradeAct::Buy);
    }
}
