use chrono::{DateTime, Utc};
use crate::types::hashrate::HASHRATE_UNITS;

/// Scales H/s by 1000 until below 1000 or the largest unit (EH/s) is reached.
pub fn format_hashrate(hashrate: f64) -> String {
    let mut value = hashrate;
    let mut unit_index = 0;

    while value >= 1000.0 && unit_index < HASHRATE_UNITS.len() - 1 {
        value /= 1000.0;
        unit_index += 1;
    }

    format!("{} {}", format_fixed(value, 2), HASHRATE_UNITS[unit_index])
}

/// Exponential notation with two fractional digits and a signed exponent: `1.23e+6`.
pub fn format_difficulty(difficulty: f64) -> String {
    if !difficulty.is_finite() {
        return difficulty.to_string();
    }

    let exponent = format!("{:e}", difficulty)
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse::<i32>().ok())
        .unwrap_or(0);
    let formatted = format!("{:.2e}", round_half_away(difficulty, 2 - exponent));
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

/// USD with at least 2 and at most 6 fractional digits.
pub fn format_price(price: f64) -> String {
    format_usd(price, 2, 6)
}

/// `$1,234.5` style currency string with trailing zeros trimmed down to
/// `min_fraction` digits.
pub fn format_usd(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, format_grouped(value.abs(), min_fraction, max_fraction))
}

/// en-US grouping with up to three fractional digits.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}", sign, format_grouped(value.abs(), 0, 3))
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_fixed(value, 2))
}

/// Fixed fractional digits, ties rounded away from zero.
pub fn format_fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, round_half_away(value, digits as i32))
}

/// Medium date, short time: `Oct 16, 2026, 3:04 PM`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y, %-I:%M %p").to_string()
}

fn format_grouped(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    let fixed = format_fixed(value, max_fraction);
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_fraction {
        fraction.push('0');
    }

    let grouped = group_thousands(integer);
    if fraction.is_empty() {
        grouped
    } else {
        format!("{}.{}", grouped, fraction)
    }
}

/// `{:.N}` breaks exact ties to even; nudges an exactly representable tie at
/// `decimals` (negative for places left of the point) to the neighbour away
/// from zero. Everything else is left to the formatter's correct rounding.
fn round_half_away(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() || value == 0.0 || decimals.abs() > 22 {
        return value;
    }

    // powers of ten up to 1e22 are exact
    let scale = 10f64.powi(decimals.abs());
    let (scaled, exact) = if decimals >= 0 {
        let scaled = value * scale;
        (scaled, value.mul_add(scale, -scaled) == 0.0)
    } else {
        let scaled = value / scale;
        (scaled, scaled.mul_add(scale, -value) == 0.0)
    };

    if !exact || scaled.fract().abs() != 0.5 {
        return value;
    }
    let rounded = scaled.round();
    if decimals >= 0 { rounded / scale } else { rounded * scale }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
