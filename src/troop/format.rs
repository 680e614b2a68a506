use crate::troop::model::Value;

const SECS_PER_DAY: u128 = 86_400;
const SECS_PER_HOUR: u128 = 3_600;
const SECS_PER_MINUTE: u128 = 60;

/// Renders seconds as `1d 2h 3m 4s`, skipping empty day/hour/minute segments.
/// Seconds are always shown. Half seconds round to even.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round_ties_even() as u128;

    let days = total / SECS_PER_DAY;
    let rem = total % SECS_PER_DAY;
    let hours = rem / SECS_PER_HOUR;
    let rem = rem % SECS_PER_HOUR;
    let mins = rem / SECS_PER_MINUTE;
    let secs = rem % SECS_PER_MINUTE;

    let mut parts = Vec::with_capacity(4);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if mins > 0 {
        parts.push(format!("{mins}m"));
    }
    parts.push(format!("{secs}s"));
    parts.join(" ")
}

/// Abbreviates large numbers: `300K`, `1.5M`, `2.25B`. Below a thousand the
/// number is printed as is.
pub fn format_human_number(n: i128) -> String {
    let abs = n.unsigned_abs();
    let (divisor, suffix) = if abs >= 1_000_000_000 {
        (1_000_000_000.0, "B")
    } else if abs >= 1_000_000 {
        (1_000_000.0, "M")
    } else if abs >= 1_000 {
        (1_000.0, "K")
    } else {
        return n.to_string();
    };

    let scaled = format!("{:.2}", n as f64 / divisor);
    let scaled = scaled.trim_end_matches('0').trim_end_matches('.');
    format!("{scaled}{suffix}")
}

/// `80K wood, 60K ore`; zero entries are left out, `None` when nothing is left.
pub fn format_resources(resources: &[Value<u128>]) -> String {
    let parts: Vec<String> = resources
        .iter()
        .filter(|res| res.value > 0)
        .map(|res| {
            let value = i128::try_from(res.value).unwrap_or(i128::MAX);
            format!("{} {}", format_human_number(value), res.kind)
        })
        .collect();

    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(", ")
    }
}
