//! Message text

use crate::config::Config;
use crate::detection::{window_label, CandidateEvent, WindowRule};
use rust_decimal::{Decimal, RoundingStrategy};

/// Price rounded to six significant digits, trailing zeros removed
pub fn format_price(price: Decimal) -> String {
    price.round_sf(6).unwrap_or(price).normalize().to_string()
}

/// Signed percentage with two decimals, e.g. "+4.00" or "-5.13"
fn format_pct(pct: Decimal) -> String {
    let magnitude = pct
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if pct < Decimal::ZERO { "-" } else { "+" };
    format!("{}{:.2}", sign, magnitude)
}

/// Alert body for one surviving event
///
/// ```text
/// 📈 PUMP XYZ +4.00% / 1m
/// Price: 104 USD
/// ```
pub fn format_alert(event: &CandidateEvent, quote_currency: &str) -> String {
    format!(
        "{} {} {} {}% / {}\nPrice: {} {}",
        event.direction.emoji(),
        event.direction,
        event.symbol,
        format_pct(event.pct_change),
        event.window_label(),
        format_price(event.price),
        quote_currency
    )
}

/// Enabled rules as "+4%/1m, −5%/5m"
pub fn rules_summary(rules: &[WindowRule]) -> String {
    let mut parts = Vec::new();
    for rule in rules {
        let label = window_label(rule.seconds);
        if let Some(up) = rule.up_pct {
            parts.push(format!("+{}%/{}", up.normalize(), label));
        }
        if let Some(down) = rule.down_pct {
            parts.push(format!("\u{2212}{}%/{}", down.abs().normalize(), label));
        }
    }
    if parts.is_empty() {
        "no rules enabled".to_string()
    } else {
        parts.join(", ")
    }
}

/// Reply to a status command
pub fn status_text(config: &Config) -> String {
    format!(
        "Bot active ✅ (Top {}, {})",
        config.source.universe_size,
        rules_summary(&config.detector.windows)
    )
}

/// Message sent once before the scan loop starts
pub fn announcement_text(config: &Config) -> String {
    let mut rules = Vec::new();
    for rule in &config.detector.windows {
        let label = window_label(rule.seconds);
        if let Some(up) = rule.up_pct {
            rules.push(format!("+{}%/{} (pump)", up.normalize(), label));
        }
        if let Some(down) = rule.down_pct {
            rules.push(format!("\u{2212}{}%/{} (dump)", down.abs().normalize(), label));
        }
    }
    format!(
        "✅ Bot started · Top {} · Rules: {}",
        config.source.universe_size,
        rules.join(" · ")
    )
}
