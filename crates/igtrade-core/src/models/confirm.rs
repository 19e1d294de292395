use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::Direction;

/// Returned by every dealing call; pass it to the confirms endpoint to learn
/// whether the deal was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealReference {
    pub deal_reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Amended,
    Closed,
    Deleted,
    Open,
    PartiallyClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AffectedDealStatus {
    Amended,
    Deleted,
    FullyClosed,
    Opened,
    PartiallyClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedDeal {
    pub deal_id: String,
    pub status: AffectedDealStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealConfirmation {
    pub deal_reference: String,
    pub deal_status: DealStatus,
    pub date: String,
    #[serde(default)]
    pub affected_deals: Vec<AffectedDeal>,
    pub deal_id: Option<String>,
    pub direction: Option<Direction>,
    pub epic: Option<String>,
    pub expiry: Option<String>,
    #[serde(default)]
    pub guaranteed_stop: bool,
    pub level: Option<Decimal>,
    pub limit_distance: Option<Decimal>,
    pub limit_level: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub profit_currency: Option<String>,
    /// Broker reason code, e.g. `SUCCESS` or `MARKET_CLOSED_WITH_EDITS`
    pub reason: Option<String>,
    pub size: Option<Decimal>,
    pub status: Option<PositionStatus>,
    pub stop_distance: Option<Decimal>,
    pub stop_level: Option<Decimal>,
    #[serde(default)]
    pub trailing_stop: bool,
}

impl DealConfirmation {
    pub fn is_accepted(&self) -> bool {
        self.deal_status == DealStatus::Accepted
    }
}
