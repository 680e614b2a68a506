use crate::troop::model::ResourceKind;

/// Buff applied when the caller supplies none.
pub const DEFAULT_BUFF: f64 = 0.45;

/// Tier whose base training time is used for tiers missing from [`BASE_TRAIN_TIME`].
pub const DEFAULT_TIME_TIER: &str = "t5";

#[derive(Debug)]
pub struct UnitCost {
    pub unit: &'static str,
    /// Per-unit cost indexed in [`ResourceKind::ALL`] order.
    pub cost: [u64; 4],
}

impl UnitCost {
    pub fn get(&self, kind: ResourceKind) -> u64 {
        self.cost[kind as usize]
    }
}

#[derive(Debug)]
pub struct TierCosts {
    pub tier: &'static str,
    pub units: &'static [UnitCost],
}

impl TierCosts {
    pub fn unit(&self, name: &str) -> Option<&'static UnitCost> {
        self.units.iter().find(|u| u.unit == name)
    }

    pub fn unit_names(&self) -> Vec<&'static str> {
        self.units.iter().map(|u| u.unit).collect()
    }
}

// cost: [wood, ore, mana, gold]
pub static COST_TABLE: &[TierCosts] = &[
    TierCosts {
        tier: "t5",
        units: &[
            UnitCost { unit: "mage", cost: [800, 600, 400, 0] },
            UnitCost { unit: "infantry", cost: [800, 0, 400, 800] },
            UnitCost { unit: "cavalry", cost: [480, 480, 400, 480] },
            UnitCost { unit: "archer", cost: [0, 800, 400, 800] },
        ],
    },
    TierCosts {
        tier: "t4",
        units: &[
            UnitCost { unit: "mage", cost: [300, 225, 100, 0] },
            UnitCost { unit: "infantry", cost: [300, 0, 100, 300] },
            UnitCost { unit: "cavalry", cost: [180, 180, 100, 180] },
            UnitCost { unit: "archer", cost: [0, 225, 100, 300] },
        ],
    },
];

/// Unbuffed per-unit training time, in seconds.
pub static BASE_TRAIN_TIME: &[(&str, u32)] = &[("t5", 83), ("t4", 56)];

pub fn tier_costs(tier: &str) -> Option<&'static TierCosts> {
    COST_TABLE.iter().find(|t| t.tier == tier)
}

pub fn base_train_time(tier: &str) -> Option<u32> {
    BASE_TRAIN_TIME
        .iter()
        .find(|(name, _)| *name == tier)
        .map(|(_, secs)| *secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_cost_tier_has_a_train_time() {
        for tier in COST_TABLE {
            assert!(base_train_time(tier.tier).is_some(), "{} has no time", tier.tier);
        }
        assert!(base_train_time(DEFAULT_TIME_TIER).is_some());
    }

    #[test]
    fn test_unit_order_is_stable() {
        let t5 = tier_costs("t5").unwrap();
        assert_eq!(t5.unit_names(), vec!["mage", "infantry", "cavalry", "archer"]);
    }

    #[test]
    fn test_unit_cost_lookup_by_kind() {
        let archer = tier_costs("t4").unwrap().unit("archer").unwrap();
        assert_eq!(archer.get(ResourceKind::Wood), 0);
        assert_eq!(archer.get(ResourceKind::Ore), 225);
        assert_eq!(archer.get(ResourceKind::Gold), 300);
    }
}
