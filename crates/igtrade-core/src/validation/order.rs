use rust_decimal::Decimal;

use super::format::{is_currency_code, is_deal_reference, is_deal_size, is_epic, is_expiry, is_good_till_date};
use super::{Rule, RuleSet, Validate};
use crate::models::{CreateWorkingOrder, UpdateWorkingOrder, WorkingOrderTimeInForce};

/// Fields both working-order shapes carry
trait OrderTerms {
    fn guaranteed_stop(&self) -> bool;
    fn stop_level(&self) -> Option<Decimal>;
    fn stop_distance(&self) -> Option<Decimal>;
    fn limit_level(&self) -> Option<Decimal>;
    fn limit_distance(&self) -> Option<Decimal>;
    fn time_in_force(&self) -> WorkingOrderTimeInForce;
    fn good_till_date(&self) -> Option<&str>;
}

macro_rules! impl_order_terms {
    ($($shape:ty),+) => {$(
        impl OrderTerms for $shape {
            fn guaranteed_stop(&self) -> bool { self.guaranteed_stop }
            fn stop_level(&self) -> Option<Decimal> { self.stop_level }
            fn stop_distance(&self) -> Option<Decimal> { self.stop_distance }
            fn limit_level(&self) -> Option<Decimal> { self.limit_level }
            fn limit_distance(&self) -> Option<Decimal> { self.limit_distance }
            fn time_in_force(&self) -> WorkingOrderTimeInForce { self.time_in_force }
            fn good_till_date(&self) -> Option<&str> { self.good_till_date.as_deref() }
        }
    )+};
}

impl_order_terms!(CreateWorkingOrder, UpdateWorkingOrder);

fn guaranteed_stop_exactly_one<T: OrderTerms>(r: &T) -> bool {
    !r.guaranteed_stop() || (r.stop_level().is_some() != r.stop_distance().is_some())
}

fn unique_limit<T: OrderTerms>(r: &T) -> bool {
    !(r.limit_level().is_some() && r.limit_distance().is_some())
}

fn unique_stop<T: OrderTerms>(r: &T) -> bool {
    !(r.stop_level().is_some() && r.stop_distance().is_some())
}

fn good_till_date_required<T: OrderTerms>(r: &T) -> bool {
    r.time_in_force() != WorkingOrderTimeInForce::GoodTillDate || r.good_till_date().is_some()
}

fn good_till_date_format<T: OrderTerms>(r: &T) -> bool {
    r.good_till_date().map_or(true, is_good_till_date)
}

/// The five rules shared by create and update, in evaluation order
macro_rules! order_term_rules {
    ($shape:ty) => {
        [
            Rule::<$shape> {
                id: "guaranteed-stop-exactly-one",
                fields: &["guaranteedStop", "stopLevel", "stopDistance"],
                message: "When guaranteedStop is true, specify exactly one of stopLevel or stopDistance.",
                holds: guaranteed_stop_exactly_one,
            },
            Rule::<$shape> {
                id: "unique-limit",
                fields: &["limitLevel", "limitDistance"],
                message: "Set only one of limitLevel or limitDistance.",
                holds: unique_limit,
            },
            Rule::<$shape> {
                id: "unique-stop",
                fields: &["stopLevel", "stopDistance"],
                message: "Set only one of stopLevel or stopDistance.",
                holds: unique_stop,
            },
            Rule::<$shape> {
                id: "good-till-date-required",
                fields: &["timeInForce", "goodTillDate"],
                message: "timeInForce GOOD_TILL_DATE requires a goodTillDate value.",
                holds: good_till_date_required,
            },
            Rule::<$shape> {
                id: "good-till-date-format",
                fields: &["goodTillDate"],
                message: "goodTillDate must be formatted yyyy/mm/dd hh:mm or yyyy/mm/dd hh:mm:ss.",
                holds: good_till_date_format,
            },
        ]
    };
}

static UPDATE_WORKING_ORDER_RULES: [Rule<UpdateWorkingOrder>; 5] =
    order_term_rules!(UpdateWorkingOrder);

static CREATE_WORKING_ORDER_RULES: [Rule<CreateWorkingOrder>; 10] = {
    let [a, b, c, d, e] = order_term_rules!(CreateWorkingOrder);
    [
        a,
        b,
        c,
        d,
        e,
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
            holds: |r| r.deal_reference.as_deref().map_or(true, is_deal_reference),
        },
        Rule {
            id: "size-format",
            fields: &["size"],
            message: "size must be greater than zero with at most two decimal places.",
            holds: |r| is_deal_size(r.size),
        },
    ]
};

impl Validate for CreateWorkingOrder {
    const RULE_SET: RuleSet = RuleSet::CreateWorkingOrder;

    fn rules() -> &'static [Rule<Self>] {
        &CREATE_WORKING_ORDER_RULES
    }
}

impl Validate for UpdateWorkingOrder {
    const RULE_SET: RuleSet = RuleSet::UpdateWorkingOrder;

    fn rules() -> &'static [Rule<Self>] {
        &UPDATE_WORKING_ORDER_RULES
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn create_order(overrides: Value) -> CreateWorkingOrder {
        let mut body = json!({
            "currencyCode": "USD",
            "direction": "BUY",
            "epic": "IX.D.FTSE.DAILY.IP",
            "expiry": "DFB",
            "forceOpen": true,
            "goodTillDate": "2023/12/31 23:59:59",
            "level": 1.0,
            "size": 1.0,
            "type": "LIMIT",
            "guaranteedStop": false,
            "timeInForce": "GOOD_TILL_CANCELLED"
        });
        if let (Some(body), Some(overrides)) = (body.as_object_mut(), overrides.as_object()) {
            body.extend(overrides.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_create_working_order_rules() {
        let cases = [
            (
                json!({ "guaranteedStop": true, "stopLevel": null, "stopDistance": null }),
                Some("When guaranteedStop is true, specify exactly one of stopLevel or stopDistance."),
            ),
            (
                json!({ "guaranteedStop": true, "stopLevel": 100.0, "stopDistance": 10.0 }),
                Some("When guaranteedStop is true, specify exactly one of stopLevel or stopDistance."),
            ),
            (
                json!({ "limitLevel": 100.0, "limitDistance": 10.0 }),
                Some("Set only one of limitLevel or limitDistance."),
            ),
            (
                json!({ "stopLevel": 100.0, "stopDistance": 10.0 }),
                Some("Set only one of stopLevel or stopDistance."),
            ),
            (
                json!({ "timeInForce": "GOOD_TILL_DATE", "goodTillDate": null }),
                Some("timeInForce GOOD_TILL_DATE requires a goodTillDate value."),
            ),
            (json!({ "guaranteedStop": true, "stopLevel": 100.0 }), None),
            (json!({ "limitLevel": 100.0 }), None),
            (json!({ "limitDistance": 10.0 }), None),
            (
                json!({ "timeInForce": "GOOD_TILL_DATE", "goodTillDate": "2023/12/31 23:59:59" }),
                None,
            ),
        ];
        for (overrides, expected) in cases {
            let order = create_order(overrides.clone());
            assert_eq!(
                order.first_violation().map(|v| v.message),
                expected,
                "{overrides}"
            );
        }
    }

    #[test]
    fn test_good_till_date_format() {
        let order = create_order(json!({
            "timeInForce": "GOOD_TILL_DATE", "goodTillDate": "2024/03/14 23:59"
        }));
        assert!(order.is_valid());

        let order = create_order(json!({
            "timeInForce": "GOOD_TILL_DATE", "goodTillDate": "2024-03-14T23:59"
        }));
        let err = order.validate().unwrap_err();
        assert_eq!(err.rule_ids(), vec!["good-till-date-format"]);
    }

    #[test]
    fn test_create_working_order_field_formats() {
        let order = create_order(json!({
            "currencyCode": "GBPX",
            "epic": "short",
            "expiry": "next week",
            "dealReference": "",
            "size": 0.005
        }));
        let err = order.validate().unwrap_err();
        assert_eq!(
            err.rule_ids(),
            vec![
                "currency-code-format",
                "epic-format",
                "expiry-format",
                "deal-reference-format",
                "size-format"
            ]
        );
    }

    #[test]
    fn test_update_working_order_shares_leading_rules() {
        let create: Vec<_> = CreateWorkingOrder::rules().iter().map(|r| r.id).collect();
        let update: Vec<_> = UpdateWorkingOrder::rules().iter().map(|r| r.id).collect();
        assert_eq!(update, create[..5]);
    }

    #[test]
    fn test_update_working_order() {
        let update: UpdateWorkingOrder = serde_json::from_value(json!({
            "level": 8452.0,
            "type": "STOP",
            "timeInForce": "GOOD_TILL_DATE"
        }))
        .unwrap();
        assert_eq!(
            update.first_violation().map(|v| v.rule),
            Some("good-till-date-required")
        );

        let update: UpdateWorkingOrder = serde_json::from_value(json!({
            "level": 8452.0,
            "type": "STOP",
            "timeInForce": "GOOD_TILL_CANCELLED",
            "stopDistance": 20.0,
            "limitDistance": 40.0
        }))
        .unwrap();
        assert!(update.validate().is_ok());
    }
}
