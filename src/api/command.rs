use crate::troop::calculator;
use crate::troop::error::TrainError;
use crate::troop::format::{format_duration, format_human_number, format_resources};
use crate::troop::model::{BuffFraction, Cost, TrainRequest};

/// Answers a `train` command. Validation failures come back as a one-line
/// message, never as an error.
pub fn handle_invocation(request: &TrainRequest) -> String {
    match run(request) {
        Ok(cost) => render_report(request, &cost),
        Err(e) => {
            tracing::debug!("Rejected train command {:?}: {}", request, e);
            e.to_string()
        }
    }
}

fn run(request: &TrainRequest) -> Result<Cost, TrainError> {
    let amount = u64::try_from(request.amount)
        .ok()
        .filter(|amount| *amount > 0)
        .ok_or(TrainError::InvalidAmount)?;

    let buff = match &request.buff {
        Some(input) => input.resolve()?,
        None => BuffFraction::default(),
    };

    calculator::evaluate(&request.tier, &request.unit, amount, buff)
}

fn render_report(request: &TrainRequest, cost: &Cost) -> String {
    [
        format!(
            "**Training:** {} × {} {}",
            format_human_number(i128::from(request.amount)),
            request.tier.to_uppercase(),
            capitalize(&request.unit)
        ),
        format!("**Resources:** {}", format_resources(&cost.resources)),
        format!(
            "**Time per unit (with {:.2}% buff):** {:.2}s ({})",
            cost.buff.percent(),
            cost.per_unit_seconds,
            format_duration(cost.per_unit_seconds)
        ),
        format!("**Total training time:** {}", format_duration(cost.total_seconds)),
    ]
    .join("\n")
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::troop::model::BuffInput;

    fn request(tier: &str, unit: &str, amount: i64, buff: Option<BuffInput>) -> TrainRequest {
        TrainRequest {
            tier: tier.to_string(),
            unit: unit.to_string(),
            amount,
            buff,
        }
    }

    #[test]
    fn test_default_buff_report() {
        let reply = handle_invocation(&request("t5", "mage", 100, None));
        assert_eq!(
            reply,
            "**Training:** 100 × T5 Mage\n\
             **Resources:** 80K wood, 60K ore, 40K mana\n\
             **Time per unit (with 45.00% buff):** 45.65s (46s)\n\
             **Total training time:** 1h 16m 5s"
        );
    }

    #[test]
    fn test_explicit_buff_report() {
        let reply = handle_invocation(&request("T4", "CAVALRY", 2_000, Some(BuffInput::Number(0.0))));
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "**Training:** 2K × T4 Cavalry");
        assert_eq!(lines[1], "**Resources:** 360K wood, 360K ore, 200K mana, 360K gold");
        assert_eq!(lines[2], "**Time per unit (with 0.00% buff):** 56.00s (56s)");
        assert_eq!(lines[3], "**Total training time:** 1d 7h 6m 40s");
    }

    #[test]
    fn test_full_buff_is_instant() {
        let reply = handle_invocation(&request("t5", "archer", 10, Some(BuffInput::Text("100".to_string()))));
        assert!(reply.contains("**Time per unit (with 100.00% buff):** 0.00s (0s)"));
        assert!(reply.ends_with("**Total training time:** 0s"));
    }

    #[test]
    fn test_invalid_amount() {
        for amount in [-5, 0, i64::MIN] {
            assert_eq!(
                handle_invocation(&request("t5", "mage", amount, None)),
                "Amount must be a positive integer."
            );
        }
    }

    #[test]
    fn test_half_second_total_rounds_to_even() {
        let reply = handle_invocation(&request("t5", "mage", 3, Some(BuffInput::Number(50.0))));
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[2], "**Time per unit (with 50.00% buff):** 41.50s (42s)");
        assert_eq!(lines[3], "**Total training time:** 2m 4s");
    }

    #[test]
    fn test_large_amount_is_computed() {
        let reply = handle_invocation(&request("t5", "mage", 2_000_000_000, None));
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines[0], "**Training:** 2B × T5 Mage");
        assert_eq!(lines[1], "**Resources:** 1600B wood, 1200B ore, 800B mana");
        assert!(lines[3].starts_with("**Total training time:** "));
    }

    #[test]
    fn test_max_amount_is_computed() {
        let reply = handle_invocation(&request("t4", "archer", i64::MAX, Some(BuffInput::Number(0.0))));
        assert!(reply.starts_with("**Training:** 9223372036.85B × T4 Archer"));
    }

    #[test]
    fn test_invalid_amount_checked_before_tier() {
        assert_eq!(
            handle_invocation(&request("t9", "healer", -5, None)),
            "Amount must be a positive integer."
        );
    }

    #[test]
    fn test_invalid_buff() {
        assert_eq!(
            handle_invocation(&request("t5", "mage", 1, Some(BuffInput::Text("quick".to_string())))),
            "Buff must be a number (percentage), e.g. 45 for 45%"
        );
        assert_eq!(
            handle_invocation(&request("t5", "mage", 1, Some(BuffInput::Number(150.0)))),
            "Buff percentage must be between 0 and 100."
        );
    }

    #[test]
    fn test_unknown_tier() {
        assert_eq!(
            handle_invocation(&request("t9", "mage", 1, None)),
            "Costs for tier `t9` are not defined yet. Provide base numbers to add support."
        );
    }

    #[test]
    fn test_unknown_unit() {
        assert_eq!(
            handle_invocation(&request("t5", "healer", 1, None)),
            "Unknown unit `healer` for t5. Valid: mage, infantry, cavalry, archer"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("mAGE"), "Mage");
        assert_eq!(capitalize(""), "");
    }
}
