use super::format::{is_currency_code, is_deal_reference, is_deal_size, is_epic, is_expiry, is_quote_id};
use super::{Rule, RuleSet, Validate};
use crate::models::{ClosePosition, CreatePosition, OrderType, UpdatePosition};

fn optional(value: Option<&String>, check: fn(&str) -> bool) -> bool {
    value.map_or(true, |v| check(v))
}

static CREATE_POSITION_RULES: &[Rule<CreatePosition>] = &[
    Rule {
        id: "trailing-stop-without-stop-level",
        fields: &["trailingStop", "stopLevel"],
        message: "Do not set stopLevel when trailingStop is true.",
        holds: |r| !r.trailing_stop || r.stop_level.is_none(),
    },
    Rule {
        id: "trailing-stop-not-guaranteed",
        fields: &["trailingStop", "guaranteedStop"],
        message: "guaranteedStop must be false when trailingStop is true.",
        holds: |r| !(r.trailing_stop && r.guaranteed_stop),
    },
    Rule {
        id: "trailing-stop-requires-distance",
        fields: &["trailingStop", "stopDistance", "trailingStopIncrement"],
        message: "Set both stopDistance and trailingStopIncrement when trailingStop is true.",
        holds: |r| {
            !r.trailing_stop || (r.stop_distance.is_some() && r.trailing_stop_increment.is_some())
        },
    },
    Rule {
        id: "limit-order-without-quote",
        fields: &["orderType", "quoteId"],
        message: "Do not set quoteId when orderType is LIMIT.",
        holds: |r| r.order_type != OrderType::Limit || r.quote_id.is_none(),
    },
    Rule {
        id: "limit-order-requires-level",
        fields: &["orderType", "level"],
        message: "Set level when orderType is LIMIT.",
        holds: |r| r.order_type != OrderType::Limit || r.level.is_some(),
    },
    Rule {
        id: "market-order-without-level-or-quote",
        fields: &["orderType", "level", "quoteId"],
        message: "Do not set level or quoteId when orderType is MARKET.",
        holds: |r| r.order_type != OrderType::Market || (r.level.is_none() && r.quote_id.is_none()),
    },
    Rule {
        id: "quote-order-requires-level-and-quote",
        fields: &["orderType", "level", "quoteId"],
        message: "Set both level and quoteId when orderType is QUOTE.",
        holds: |r| r.order_type != OrderType::Quote || (r.level.is_some() && r.quote_id.is_some()),
    },
    Rule {
        id: "guaranteed-stop-exactly-one",
        fields: &["guaranteedStop", "stopLevel", "stopDistance"],
        message: "When guaranteedStop is true, specify exactly one of stopLevel or stopDistance.",
        holds: |r| !r.guaranteed_stop || (r.stop_level.is_some() != r.stop_distance.is_some()),
    },
    Rule {
        id: "force-open-required",
        fields: &["forceOpen", "limitDistance", "limitLevel", "stopDistance", "stopLevel"],
        message: "forceOpen must be true if limit or stop constraints are set.",
        holds: |r| {
            r.force_open
                || [r.limit_distance, r.limit_level, r.stop_distance, r.stop_level]
                    .iter()
                    .all(Option::is_none)
        },
    },
    Rule {
        id: "unique-limit",
        fields: &["limitLevel", "limitDistance"],
        message: "Set only one of limitLevel or limitDistance.",
        holds: |r| !(r.limit_level.is_some() && r.limit_distance.is_some()),
    },
    Rule {
        id: "unique-stop",
        fields: &["stopLevel", "stopDistance"],
        message: "Set only one of stopLevel or stopDistance.",
        holds: |r| !(r.stop_level.is_some() && r.stop_distance.is_some()),
    },
    Rule {
        id: "currency-code-format",
        fields: &["currencyCode"],
        message: "currencyCode must be three uppercase letters.",
        holds: |r| is_currency_code(&r.currency_code),
    },
    Rule {
        id: "epic-format",
        fields: &["epic"],
        message: "epic must be 6-30 letters, digits, '.' or '_'.",
        holds: |r| is_epic(&r.epic),
    },
    Rule {
        id: "expiry-format",
        fields: &["expiry"],
        message: "expiry must be DFB, -, MMM-YY or DD-MMM-YY.",
        holds: |r| is_expiry(&r.expiry),
    },
    Rule {
        id: "deal-reference-format",
        fields: &["dealReference"],
        message: "dealReference must be 1-30 letters, digits, '_', '-' or '.'.",
        holds: |r| optional(r.deal_reference.as_ref(), is_deal_reference),
    },
    Rule {
        id: "quote-id-format",
        fields: &["quoteId"],
        message: "quoteId must be alphanumeric.",
        holds: |r| optional(r.quote_id.as_ref(), is_quote_id),
    },
    Rule {
        id: "size-format",
        fields: &["size"],
        message: "size must be greater than zero with at most two decimal places.",
        holds: |r| is_deal_size(r.size),
    },
];

static CLOSE_POSITION_RULES: &[Rule<ClosePosition>] = &[
    Rule {
        id: "limit-order-without-quote",
        fields: &["orderType", "quoteId"],
        message: "quoteId is not allowed when orderType is LIMIT.",
        holds: |r| r.order_type != OrderType::Limit || r.quote_id.is_none(),
    },
    Rule {
        id: "limit-order-requires-level",
        fields: &["orderType", "level"],
        message: "level is required when orderType is LIMIT.",
        holds: |r| r.order_type != OrderType::Limit || r.level.is_some(),
    },
    Rule {
        id: "market-order-without-level-or-quote",
        fields: &["orderType", "level", "quoteId"],
        message: "level and quoteId are not allowed when orderType is MARKET.",
        holds: |r| r.order_type != OrderType::Market || (r.level.is_none() && r.quote_id.is_none()),
    },
    Rule {
        id: "quote-order-requires-quote",
        fields: &["orderType", "quoteId"],
        message: "quoteId is required when orderType is QUOTE.",
        holds: |r| r.order_type != OrderType::Quote || r.quote_id.is_some(),
    },
    Rule {
        id: "quote-order-requires-level",
        fields: &["orderType", "level"],
        message: "level is required when orderType is QUOTE.",
        holds: |r| r.order_type != OrderType::Quote || r.level.is_some(),
    },
    Rule {
        id: "unique-target",
        fields: &["dealId", "epic"],
        message: "Set only one of dealId or epic.",
        holds: |r| !(r.deal_id.is_some() && r.epic.is_some()),
    },
    Rule {
        id: "target-required",
        fields: &["dealId", "epic"],
        message: "Set one of dealId or epic.",
        holds: |r| r.deal_id.is_some() || r.epic.is_some(),
    },
    Rule {
        id: "epic-requires-expiry",
        fields: &["epic", "expiry"],
        message: "Set expiry when epic is set.",
        holds: |r| r.epic.is_none() || r.expiry.is_some(),
    },
    Rule {
        id: "epic-format",
        fields: &["epic"],
        message: "epic must be 6-30 letters, digits, '.' or '_'.",
        holds: |r| optional(r.epic.as_ref(), is_epic),
    },
    Rule {
        id: "expiry-format",
        fields: &["expiry"],
        message: "expiry must be DFB, -, MMM-YY or DD-MMM-YY.",
        holds: |r| optional(r.expiry.as_ref(), is_expiry),
    },
    Rule {
        id: "quote-id-format",
        fields: &["quoteId"],
        message: "quoteId must be alphanumeric.",
        holds: |r| optional(r.quote_id.as_ref(), is_quote_id),
    },
    Rule {
        id: "size-format",
        fields: &["size"],
        message: "size must be greater than zero with at most two decimal places.",
        holds: |r| is_deal_size(r.size),
    },
];

static UPDATE_POSITION_RULES: &[Rule<UpdatePosition>] = &[
    Rule {
        id: "guaranteed-and-trailing-exclusive",
        fields: &["guaranteedStop", "trailingStop"],
        message: "guaranteedStop and trailingStop cannot both be true.",
        holds: |r| !(r.guaranteed_stop && r.trailing_stop),
    },
    Rule {
        id: "guaranteed-stop-requires-level",
        fields: &["guaranteedStop", "stopLevel"],
        message: "If guaranteedStop is true, then stopLevel must be set.",
        holds: |r| !r.guaranteed_stop || r.stop_level.is_some(),
    },
    Rule {
        id: "trailing-stop-requires-settings",
        fields: &["trailingStop", "trailingStopDistance", "trailingStopIncrement", "stopLevel"],
        message: "If trailingStop is true, then trailingStopDistance, trailingStopIncrement, and stopLevel must be set.",
        holds: |r| {
            !r.trailing_stop
                || (r.trailing_stop_distance.is_some()
                    && r.trailing_stop_increment.is_some()
                    && r.stop_level.is_some())
        },
    },
    Rule {
        id: "no-trailing-settings-without-trailing-stop",
        fields: &["trailingStop", "trailingStopDistance", "trailingStopIncrement"],
        message: "If trailingStop is false, then DO NOT set trailingStopDistance or trailingStopIncrement.",
        holds: |r| {
            r.trailing_stop
                || (r.trailing_stop_distance.is_none() && r.trailing_stop_increment.is_none())
        },
    },
];

impl Validate for CreatePosition {
    const RULE_SET: RuleSet = RuleSet::CreatePosition;

    fn rules() -> &'static [Rule<Self>] {
        CREATE_POSITION_RULES
    }
}

impl Validate for ClosePosition {
    const RULE_SET: RuleSet = RuleSet::ClosePosition;

    fn rules() -> &'static [Rule<Self>] {
        CLOSE_POSITION_RULES
    }
}

impl Validate for UpdatePosition {
    const RULE_SET: RuleSet = RuleSet::UpdatePosition;

    fn rules() -> &'static [Rule<Self>] {
        UPDATE_POSITION_RULES
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    use super::*;
    use crate::validation::TradeRequest;

    fn merged(mut base: Value, overrides: Value) -> Value {
        if let (Some(base), Some(overrides)) = (base.as_object_mut(), overrides.as_object()) {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        base
    }

    fn create_position(overrides: Value) -> CreatePosition {
        let base = json!({
            "currencyCode": "USD",
            "direction": "BUY",
            "epic": "IX.D.FTSE.DAILY.IP",
            "expiry": "DFB",
            "forceOpen": true,
            "guaranteedStop": false,
            "orderType": "MARKET",
            "size": 1,
            "timeInForce": "EXECUTE_AND_ELIMINATE",
            "trailingStop": false
        });
        serde_json::from_value(merged(base, overrides)).unwrap()
    }

    fn close_position(overrides: Value) -> ClosePosition {
        let base = json!({
            "direction": "SELL",
            "orderType": "MARKET",
            "size": 1,
            "timeInForce": "EXECUTE_AND_ELIMINATE",
            "dealId": "DIAAAABBBCCC123"
        });
        serde_json::from_value(merged(base, overrides)).unwrap()
    }

    fn first_message<T: Validate>(request: &T) -> Option<&'static str> {
        request.first_violation().map(|v| v.message)
    }

    #[test]
    fn test_create_position_force_open() {
        for field in ["limitDistance", "limitLevel", "stopDistance", "stopLevel"] {
            let value = if field.ends_with("Level") { 100.0 } else { 10.0 };

            let request = create_position(json!({ "forceOpen": false, field: value }));
            assert_eq!(
                first_message(&request),
                Some("forceOpen must be true if limit or stop constraints are set."),
                "{field}"
            );

            let request = create_position(json!({ "forceOpen": true, field: value }));
            assert_eq!(request.validate(), Ok(()), "{field}");
        }
    }

    #[test]
    fn test_create_position_guaranteed_stop() {
        let request = create_position(json!({
            "guaranteedStop": true, "stopLevel": 100.0, "stopDistance": 10.0
        }));
        assert_eq!(
            first_message(&request),
            Some("When guaranteedStop is true, specify exactly one of stopLevel or stopDistance.")
        );

        let request = create_position(json!({ "guaranteedStop": true }));
        assert_eq!(request.first_violation().map(|v| v.rule), Some("guaranteed-stop-exactly-one"));

        let request = create_position(json!({ "guaranteedStop": true, "stopLevel": 100.0 }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_create_position_order_type() {
        let request = create_position(json!({ "orderType": "LIMIT", "quoteId": "12345" }));
        assert_eq!(first_message(&request), Some("Do not set quoteId when orderType is LIMIT."));

        let request = create_position(json!({ "orderType": "LIMIT" }));
        assert_eq!(first_message(&request), Some("Set level when orderType is LIMIT."));

        let request = create_position(json!({ "orderType": "MARKET", "level": 100.0 }));
        assert_eq!(
            first_message(&request),
            Some("Do not set level or quoteId when orderType is MARKET.")
        );

        let request = create_position(json!({ "orderType": "QUOTE", "level": 100.0 }));
        assert_eq!(
            first_message(&request),
            Some("Set both level and quoteId when orderType is QUOTE.")
        );

        let request = create_position(json!({
            "orderType": "QUOTE", "level": 100.0, "quoteId": "12345"
        }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_create_position_trailing_stop() {
        let request = create_position(json!({ "trailingStop": true, "stopLevel": 100.0 }));
        assert_eq!(
            first_message(&request),
            Some("Do not set stopLevel when trailingStop is true.")
        );

        let request = create_position(json!({ "trailingStop": true, "guaranteedStop": true }));
        assert_eq!(
            first_message(&request),
            Some("guaranteedStop must be false when trailingStop is true.")
        );

        let request = create_position(json!({ "trailingStop": true, "stopDistance": 10.0 }));
        assert_eq!(
            first_message(&request),
            Some("Set both stopDistance and trailingStopIncrement when trailingStop is true.")
        );

        let request = create_position(json!({
            "trailingStop": true, "stopDistance": 10.0, "trailingStopIncrement": 1.0
        }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_create_position_unique_constraints() {
        let request = create_position(json!({ "limitLevel": 100.0, "limitDistance": 10.0 }));
        assert_eq!(first_message(&request), Some("Set only one of limitLevel or limitDistance."));

        let request = create_position(json!({ "stopLevel": 100.0, "stopDistance": 10.0 }));
        assert_eq!(first_message(&request), Some("Set only one of stopLevel or stopDistance."));
    }

    #[test]
    fn test_create_position_collects_all_violations_in_order() {
        let request = create_position(json!({
            "forceOpen": false,
            "limitLevel": 100.0,
            "limitDistance": 10.0,
            "currencyCode": "usd",
            "size": 0.001
        }));

        let ids: Vec<_> = request.violations().iter().map(|v| v.rule).collect();
        assert_eq!(
            ids,
            vec!["force-open-required", "unique-limit", "currency-code-format", "size-format"]
        );
        let err = request.validate().unwrap_err();
        assert_eq!(err.rule_set, RuleSet::CreatePosition);
        assert_eq!(err.rule_ids(), ids);
        assert_eq!(err.violations[3].fields, &["size"]);
    }

    #[test]
    fn test_create_position_field_formats() {
        let cases = [
            (json!({ "epic": "E1" }), "epic-format"),
            (json!({ "expiry": "2024-12" }), "expiry-format"),
            (json!({ "dealReference": "not allowed!" }), "deal-reference-format"),
            (json!({ "orderType": "QUOTE", "level": 1.0, "quoteId": "q-1" }), "quote-id-format"),
            (json!({ "size": 0 }), "size-format"),
        ];
        for (overrides, rule) in cases {
            let request = create_position(overrides);
            let ids: Vec<_> = request.violations().iter().map(|v| v.rule).collect();
            assert_eq!(ids, vec![rule]);
        }

        let request = create_position(json!({ "expiry": "15-MAR-25", "dealReference": "ref_1" }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_validation_does_not_mutate_request() {
        let request = create_position(json!({ "forceOpen": false, "stopLevel": 100.0 }));
        let before = request.clone();
        let _ = request.violations();
        let _ = request.validate();
        assert_eq!(request, before);
    }

    #[test]
    fn test_close_position_order_type() {
        let cases = [
            (
                json!({ "orderType": "QUOTE", "level": 100.0 }),
                "quoteId is required when orderType is QUOTE.",
            ),
            (
                json!({ "orderType": "QUOTE", "quoteId": "12345" }),
                "level is required when orderType is QUOTE.",
            ),
            (
                json!({ "orderType": "MARKET", "level": 100.0, "quoteId": "12345" }),
                "level and quoteId are not allowed when orderType is MARKET.",
            ),
            (
                json!({ "orderType": "LIMIT", "quoteId": "12345" }),
                "quoteId is not allowed when orderType is LIMIT.",
            ),
            (
                json!({ "orderType": "LIMIT", "level": null }),
                "level is required when orderType is LIMIT.",
            ),
        ];
        for (overrides, message) in cases {
            assert_eq!(first_message(&close_position(overrides)), Some(message));
        }

        let request = close_position(json!({ "orderType": "LIMIT", "level": 100.0 }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_close_position_target() {
        let request = close_position(json!({ "dealId": "D1", "epic": "E1" }));
        assert_eq!(first_message(&request), Some("Set only one of dealId or epic."));

        let request = close_position(json!({ "dealId": null, "epic": null }));
        assert_eq!(first_message(&request), Some("Set one of dealId or epic."));

        let request = close_position(json!({ "dealId": null, "epic": "CS.D.GBPUSD.TODAY.IP" }));
        assert_eq!(first_message(&request), Some("Set expiry when epic is set."));

        let request = close_position(json!({
            "dealId": null, "epic": "CS.D.GBPUSD.TODAY.IP", "expiry": "DFB"
        }));
        assert!(request.is_valid());
    }

    #[test]
    fn test_close_position_size() {
        let mut request = close_position(json!({}));
        request.size = dec!(0.125);
        assert_eq!(request.first_violation().map(|v| v.rule), Some("size-format"));
    }

    #[test]
    fn test_update_position() {
        let cases = [
            (
                json!({ "guaranteedStop": true, "trailingStop": true, "stopLevel": 100.0 }),
                Some("guaranteedStop and trailingStop cannot both be true."),
            ),
            (
                json!({ "guaranteedStop": true, "trailingStop": false }),
                Some("If guaranteedStop is true, then stopLevel must be set."),
            ),
            (
                json!({ "trailingStop": true, "guaranteedStop": false }),
                Some("If trailingStop is true, then trailingStopDistance, trailingStopIncrement, and stopLevel must be set."),
            ),
            (
                json!({ "trailingStop": false, "trailingStopDistance": 10.0 }),
                Some("If trailingStop is false, then DO NOT set trailingStopDistance or trailingStopIncrement."),
            ),
            (
                json!({ "guaranteedStop": true, "stopLevel": 100.0, "trailingStop": false }),
                None,
            ),
            (
                json!({
                    "trailingStop": true,
                    "trailingStopDistance": 5.0,
                    "trailingStopIncrement": 1.0,
                    "stopLevel": 100.0,
                    "guaranteedStop": false
                }),
                None,
            ),
        ];
        for (payload, expected) in cases {
            let request = TradeRequest::from_json(RuleSet::UpdatePosition, &payload.to_string())
                .unwrap();
            assert_eq!(request.first_violation().map(|v| v.message), expected);
        }
    }

    #[test]
    fn test_empty_update_is_valid() {
        assert!(UpdatePosition::default().is_valid());
    }
}
