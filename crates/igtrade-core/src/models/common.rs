use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// The side that closes a position opened in this direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => f.pad("BUY"),
            Direction::Sell => f.pad("SELL"),
        }
    }
}

/// Execution style of an OTC position request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Fill at `level` or better
    Limit,
    /// Fill at the current price
    Market,
    /// Fill against a previously obtained quote (`level` + `quoteId`)
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionTimeInForce {
    ExecuteAndEliminate,
    FillOrKill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentType {
    Shares,
    Binary,
    BungeeCapped,
    BungeeCommodities,
    BungeeCurrencies,
    BungeeIndices,
    Commodities,
    Currencies,
    Indices,
    KnockoutsCommodities,
    KnockoutsCurrencies,
    KnockoutsIndices,
    KnockoutsShares,
    OptCommodities,
    OptCurrencies,
    OptIndices,
    OptRates,
    OptShares,
    Rates,
    Sectors,
    SprintMarket,
    TestMarket,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Tradeable,
    Closed,
    EditsOnly,
    Offline,
    OnAuction,
    OnAuctionNoEdits,
    Suspended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_wire_format() {
        assert_eq!(serde_json::to_string(&Direction::Buy).unwrap(), r#""BUY""#);
        assert_eq!(
            serde_json::from_str::<Direction>(r#""SELL""#).unwrap(),
            Direction::Sell
        );
        assert!(serde_json::from_str::<Direction>(r#""HOLD""#).is_err());
        assert_eq!(Direction::Buy.opposite(), Direction::Sell);
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(
            serde_json::to_string(&PositionTimeInForce::ExecuteAndEliminate).unwrap(),
            r#""EXECUTE_AND_ELIMINATE""#
        );
        assert_eq!(
            serde_json::from_str::<MarketStatus>(r#""ON_AUCTION_NO_EDITS""#).unwrap(),
            MarketStatus::OnAuctionNoEdits
        );
        assert_eq!(
            serde_json::from_str::<InstrumentType>(r#""KNOCKOUTS_SHARES""#).unwrap(),
            InstrumentType::KnockoutsShares
        );
    }

    #[test]
    fn test_unlisted_instrument_type_is_unknown() {
        assert_eq!(
            serde_json::from_str::<InstrumentType>(r#""SOMETHING_NEW""#).unwrap(),
            InstrumentType::Unknown
        );
    }
}
