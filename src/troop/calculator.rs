use crate::troop::error::TrainError;
use crate::troop::model::{BuffFraction, Cost, ResourceKind, Value};
use crate::troop::table::{self, DEFAULT_TIME_TIER};

/// Total resources for `amount` units, one entry per resource kind (zeros included).
/// Totals are `u128` so any `u64` amount fits.
///
/// Lookups are case-insensitive. `amount` is expected to be validated by the caller.
pub fn resolve_costs(tier: &str, unit: &str, amount: u64) -> Result<Vec<Value<u128>>, TrainError> {
    let tier_key = tier.to_lowercase();
    let unit_key = unit.to_lowercase();

    let costs = table::tier_costs(&tier_key).ok_or_else(|| TrainError::UnknownTier(tier.to_string()))?;
    let unit_cost = costs.unit(&unit_key).ok_or_else(|| TrainError::UnknownUnit {
        tier: tier.to_string(),
        unit: unit.to_string(),
        valid: costs.unit_names(),
    })?;

    Ok(ResourceKind::ALL
        .iter()
        .map(|kind| Value {
            kind: *kind,
            value: u128::from(unit_cost.get(*kind)) * u128::from(amount),
        })
        .collect())
}

/// Per-unit and total training seconds.
///
/// A tier without a base time falls back to [`DEFAULT_TIME_TIER`]. This is only
/// reachable when costs have not been resolved first, see [`evaluate`].
pub fn resolve_timing(tier: &str, amount: u64, buff: BuffFraction) -> (f64, f64) {
    let base = table::base_train_time(&tier.to_lowercase())
        .or_else(|| table::base_train_time(DEFAULT_TIME_TIER))
        .unwrap_or_default();

    let per_unit = f64::from(base) * (1.0 - buff.fraction());
    let total = per_unit * amount as f64;
    (per_unit, total)
}

/// Resolves costs, then timing. Cost resolution runs first so an unknown tier
/// is rejected before the timing fallback can apply.
pub fn evaluate(tier: &str, unit: &str, amount: u64, buff: BuffFraction) -> Result<Cost, TrainError> {
    let resources = resolve_costs(tier, unit, amount)?;
    let (per_unit_seconds, total_seconds) = resolve_timing(tier, amount, buff);

    tracing::debug!(
        "Evaluated {} x {} {}: {:?}, {:.2}s per unit",
        amount,
        tier,
        unit,
        resources,
        per_unit_seconds
    );

    Ok(Cost {
        resources,
        per_unit_seconds,
        total_seconds,
        buff,
    })
}
