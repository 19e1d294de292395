use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{Direction, InstrumentType, MarketStatus, OrderType, PositionTimeInForce};

/// Body of `POST /positions/otc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePosition {
    pub currency_code: String,
    pub direction: Direction,
    pub epic: String,
    pub expiry: String,
    pub force_open: bool,
    pub guaranteed_stop: bool,
    pub order_type: OrderType,
    pub time_in_force: PositionTimeInForce,
    pub trailing_stop: bool,
    pub size: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<Decimal>,
}

impl CreatePosition {
    /// A plain market order with no stops or limits attached
    pub fn market(
        epic: impl Into<String>,
        direction: Direction,
        size: Decimal,
        currency_code: impl Into<String>,
    ) -> Self {
        Self {
            currency_code: currency_code.into(),
            direction,
            epic: epic.into(),
            expiry: "DFB".to_string(),
            force_open: true,
            guaranteed_stop: false,
            order_type: OrderType::Market,
            time_in_force: PositionTimeInForce::ExecuteAndEliminate,
            trailing_stop: false,
            size,
            deal_reference: None,
            level: None,
            limit_distance: None,
            limit_level: None,
            quote_id: None,
            stop_distance: None,
            stop_level: None,
            trailing_stop_increment: None,
        }
    }
}

/// Body of the close request. Identify the position by `deal_id`, or by
/// `epic` plus `expiry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosePosition {
    pub direction: Direction,
    pub order_type: OrderType,
    pub size: Decimal,
    pub time_in_force: PositionTimeInForce,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
}

impl ClosePosition {
    /// Close (part of) an open position at market
    pub fn market(deal_id: impl Into<String>, direction: Direction, size: Decimal) -> Self {
        Self {
            direction,
            order_type: OrderType::Market,
            size,
            time_in_force: PositionTimeInForce::ExecuteAndEliminate,
            deal_id: Some(deal_id.into()),
            epic: None,
            expiry: None,
            level: None,
            quote_id: None,
        }
    }
}

/// Body of `PUT /positions/otc/{dealId}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePosition {
    #[serde(default)]
    pub guaranteed_stop: bool,
    #[serde(default)]
    pub trailing_stop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_stop_increment: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    pub instrument_name: String,
    pub expiry: String,
    pub epic: String,
    pub instrument_type: InstrumentType,
    pub lot_size: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub percentage_change: Decimal,
    pub net_change: Decimal,
    pub bid: Decimal,
    pub offer: Decimal,
    pub update_time: String,
    #[serde(rename = "updateTimeUTC")]
    pub update_time_utc: String,
    pub delay_time: i64,
    pub streaming_prices_available: bool,
    pub market_status: MarketStatus,
    pub scaling_factor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub contract_size: Decimal,
    pub controlled_risk: bool,
    pub created_date: String,
    #[serde(rename = "createdDateUTC")]
    pub created_date_utc: String,
    pub currency: String,
    pub deal_id: String,
    pub deal_reference: String,
    pub direction: Direction,
    pub level: Decimal,
    pub size: Decimal,
    pub limit_level: Option<Decimal>,
    pub limited_risk_premium: Option<Decimal>,
    pub stop_level: Option<Decimal>,
    pub trailing_step: Option<Decimal>,
    pub trailing_stop_distance: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub position: Position,
    pub market: Market,
}

impl OpenPosition {
    /// Request that closes this whole position at market
    pub fn close_at_market(&self) -> ClosePosition {
        ClosePosition::market(
            self.position.deal_id.clone(),
            self.position.direction.opposite(),
            self.position.size,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPositions {
    pub positions: Vec<OpenPosition>,
}
