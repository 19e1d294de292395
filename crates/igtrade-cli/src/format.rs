use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use igtrade_core::models::{DealConfirmation, OpenPosition, WorkingOrder};
use igtrade_core::RuleViolation;

const NAME_WIDTH: usize = 28;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional level or distance, `-` when absent
pub fn format_level(value: Option<Decimal>) -> String {
    value
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Wire name of a broker enum (`ACCEPTED`, `PARTIALLY_CLOSED`, ...)
pub fn wire_name(value: &impl Serialize) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(name)) => name,
        _ => "?".to_string(),
    }
}

/// "expires in 5h 42m (14:30 UTC)", or "expired" once past
pub fn session_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = expiry - now;
    if remaining.num_seconds() <= 0 {
        return "expired".to_string();
    }
    let minutes = remaining.num_minutes();
    format!(
        "expires in {}h {}m ({} UTC)",
        minutes / 60,
        minutes % 60,
        expiry.format("%H:%M")
    )
}

pub fn positions_table(positions: &[OpenPosition]) -> String {
    let mut lines = vec![format!(
        "{:<18} {:<name$} {:<4} {:>8} {:>10} {:>10} {:>10}",
        "DEAL ID",
        "MARKET",
        "DIR",
        "SIZE",
        "LEVEL",
        "STOP",
        "LIMIT",
        name = NAME_WIDTH
    )];
    for open in positions {
        let p = &open.position;
        lines.push(format!(
            "{:<18} {:<name$} {:<4} {:>8} {:>10} {:>10} {:>10}",
            p.deal_id,
            truncate_string(&open.market.instrument_name, NAME_WIDTH),
            p.direction,
            p.size.normalize(),
            p.level.normalize(),
            format_level(p.stop_level),
            format_level(p.limit_level),
            name = NAME_WIDTH
        ));
    }
    lines.join("\n")
}

pub fn orders_table(orders: &[WorkingOrder]) -> String {
    let mut lines = vec![format!(
        "{:<18} {:<name$} {:<4} {:<6} {:>8} {:>10} {}",
        "DEAL ID",
        "MARKET",
        "DIR",
        "TYPE",
        "SIZE",
        "LEVEL",
        "TIME IN FORCE",
        name = NAME_WIDTH
    )];
    for order in orders {
        let data = &order.working_order_data;
        let mut time_in_force = wire_name(&data.time_in_force);
        if let Some(ref good_till) = data.good_till_date {
            time_in_force = format!("{} {}", time_in_force, good_till);
        }
        lines.push(format!(
            "{:<18} {:<name$} {:<4} {:<6} {:>8} {:>10} {}",
            data.deal_id,
            truncate_string(&order.market_data.instrument_name, NAME_WIDTH),
            data.direction,
            wire_name(&data.order_type),
            data.order_size.normalize(),
            data.order_level.normalize(),
            time_in_force,
            name = NAME_WIDTH
        ));
    }
    lines.join("\n")
}

pub fn confirmation(confirmation: &DealConfirmation) -> String {
    let mut lines = vec![format!(
        "{} {}",
        confirmation.deal_reference,
        wire_name(&confirmation.deal_status)
    )];
    if let Some(ref reason) = confirmation.reason {
        lines.push(format!("  reason:  {}", reason));
    }
    if let Some(ref deal_id) = confirmation.deal_id {
        let status = confirmation
            .status
            .map(|s| format!(" ({})", wire_name(&s)))
            .unwrap_or_default();
        lines.push(format!("  deal:    {}{}", deal_id, status));
    }
    if let (Some(epic), Some(direction)) = (&confirmation.epic, confirmation.direction) {
        lines.push(format!(
            "  order:   {} {} {} @ {}",
            direction,
            format_level(confirmation.size),
            epic,
            format_level(confirmation.level)
        ));
    }
    for affected in &confirmation.affected_deals {
        lines.push(format!(
            "  affects: {} {}",
            affected.deal_id,
            wire_name(&affected.status)
        ));
    }
    lines.join("\n")
}

pub fn violation(violation: &RuleViolation) -> String {
    format!(
        "{} [{}]: {}",
        violation.rule,
        violation.fields.join(", "),
        violation.message
    )
}
