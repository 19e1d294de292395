use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::common::{Direction, InstrumentType, MarketStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderType {
    Limit,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkingOrderTimeInForce {
    GoodTillCancelled,
    GoodTillDate,
}

/// Body of `POST /workingorders/otc`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkingOrder {
    pub currency_code: String,
    pub direction: Direction,
    pub epic: String,
    pub expiry: String,
    #[serde(default)]
    pub force_open: bool,
    pub guaranteed_stop: bool,
    pub level: Decimal,
    pub size: Decimal,
    pub time_in_force: WorkingOrderTimeInForce,
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_reference: Option<String>,
    /// `yyyy/mm/dd hh:mm[:ss]`, required for GOOD_TILL_DATE
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_till_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
}

/// Body of `PUT /workingorders/otc/{dealId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkingOrder {
    #[serde(default)]
    pub guaranteed_stop: bool,
    pub level: Decimal,
    pub time_in_force: WorkingOrderTimeInForce,
    #[serde(rename = "type")]
    pub order_type: WorkingOrderType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_till_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_level: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_distance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_level: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrderData {
    pub deal_id: String,
    pub direction: Direction,
    pub epic: String,
    pub order_size: Decimal,
    pub order_level: Decimal,
    pub time_in_force: WorkingOrderTimeInForce,
    pub good_till_date: Option<String>,
    #[serde(rename = "goodTillDateISO")]
    pub good_till_date_iso: Option<String>,
    pub created_date: String,
    #[serde(rename = "createdDateUTC")]
    pub created_date_utc: String,
    pub guaranteed_stop: bool,
    pub order_type: WorkingOrderType,
    pub stop_distance: Option<Decimal>,
    pub limit_distance: Option<Decimal>,
    pub currency_code: String,
    pub dma: bool,
    pub limited_risk_premium: Option<Decimal>,
}

/// Market snapshot attached to a working order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub instrument_name: String,
    pub exchange_id: String,
    pub expiry: String,
    pub market_status: MarketStatus,
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
    pub scaling_factor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrder {
    pub working_order_data: WorkingOrderData,
    pub market_data: MarketData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingOrders {
    pub working_orders: Vec<WorkingOrder>,
}

#[cfg(test)]
pub(crate) mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    pub(crate) fn sample_working_orders_json() -> serde_json::Value {
        serde_json::json!({
            "workingOrders": [
                {
                    "workingOrderData": {
                        "dealId": "DIAAAAPJP4A6DAS",
                        "direction": "SELL",
                        "epic": "CS.D.GBPUSD.TODAY.IP",
                        "orderSize": 0.50,
                        "orderLevel": 12805.0,
                        "timeInForce": "GOOD_TILL_DATE",
                        "goodTillDate": "2024/03/14 23:59",
                        "goodTillDateISO": "2024-03-14T23:59",
                        "createdDate": "2024/03/13 23:41:09:000",
                        "createdDateUTC": "2024-03-13T23:41:09",
                        "guaranteedStop": false,
                        "orderType": "LIMIT",
                        "stopDistance": 5.0,
                        "limitDistance": 8.0,
                        "currencyCode": "GBP",
                        "dma": false,
                        "limitedRiskPremium": null
                    },
                    "marketData": {
                        "instrumentName": "GBP/USD",
                        "exchangeId": "FX_BET_ALL",
                        "expiry": "DFB",
                        "marketStatus": "TRADEABLE",
                        "epic": "CS.D.GBPUSD.TODAY.IP",
                        "instrumentType": "CURRENCIES",
                        "lotSize": 10.0,
                        "high": 12805.9,
                        "low": 12788.8,
                        "percentageChange": 0.03,
                        "netChange": 4.4,
                        "bid": 12801.2,
                        "offer": 12802.7,
                        "updateTime": "23:41:22",
                        "updateTimeUTC": "23:41:22",
                        "delayTime": 0,
                        "streamingPricesAvailable": true,
                        "scalingFactor": 1
                    }
                }
            ]
        })
    }

    #[test]
    fn test_parse_working_orders() {
        let orders: WorkingOrders = serde_json::from_value(sample_working_orders_json()).unwrap();
        assert_eq!(orders.working_orders.len(), 1);

        let order = &orders.working_orders[0];
        assert_eq!(order.working_order_data.deal_id, "DIAAAAPJP4A6DAS");
        assert_eq!(order.working_order_data.order_size, dec!(0.5));
        assert_eq!(order.working_order_data.order_type, WorkingOrderType::Limit);
        assert_eq!(
            order.working_order_data.time_in_force,
            WorkingOrderTimeInForce::GoodTillDate
        );
        assert_eq!(order.market_data.instrument_type, InstrumentType::Currencies);
        assert_eq!(order.market_data.exchange_id, "FX_BET_ALL");
    }

    #[test]
    fn test_order_type_serializes_as_type() {
        let update = UpdateWorkingOrder {
            guaranteed_stop: false,
            level: dec!(1.2345),
            time_in_force: WorkingOrderTimeInForce::GoodTillCancelled,
            order_type: WorkingOrderType::Stop,
            good_till_date: None,
            limit_distance: None,
            limit_level: None,
            stop_distance: Some(dec!(20)),
            stop_level: None,
        };

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["type"], "STOP");
        assert_eq!(body["timeInForce"], "GOOD_TILL_CANCELLED");
        assert!(body.get("orderType").is_none());
        assert!(body.get("goodTillDate").is_none());
    }
}
