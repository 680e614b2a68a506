use std::fmt;

use serde::Deserialize;

use crate::troop::error::{BuffError, TrainError};
use crate::troop::table::DEFAULT_BUFF;

/// The currencies consumed by training, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Wood,
    Ore,
    Mana,
    Gold,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Wood,
        ResourceKind::Ore,
        ResourceKind::Mana,
        ResourceKind::Gold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Wood => "wood",
            ResourceKind::Ore => "ore",
            ResourceKind::Mana => "mana",
            ResourceKind::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Value<T> {
    pub kind: ResourceKind,
    pub value: T,
}

/// Resource totals plus timing for one training order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cost {
    pub resources: Vec<Value<u128>>,
    pub per_unit_seconds: f64,
    pub total_seconds: f64,
    pub buff: BuffFraction,
}

impl Cost {
    pub fn get(&self, kind: ResourceKind) -> u128 {
        self.resources
            .iter()
            .find(|res| res.kind == kind)
            .map_or(0, |res| res.value)
    }
}

/// Proportional reduction of training time, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BuffFraction(f64);

impl BuffFraction {
    pub fn from_percent(percent: f64) -> Result<Self, TrainError> {
        // NaN fails the range check as well
        if !(0.0..=100.0).contains(&percent) {
            return Err(TrainError::InvalidBuff(BuffError::OutOfRange));
        }
        Ok(Self(percent / 100.0))
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }
}

impl Default for BuffFraction {
    fn default() -> Self {
        Self(DEFAULT_BUFF)
    }
}

/// Buff as supplied by a caller: a JSON number or something that should parse as one.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum BuffInput {
    Number(f64),
    Text(String),
}

impl BuffInput {
    pub fn resolve(&self) -> Result<BuffFraction, TrainError> {
        let percent = match self {
            BuffInput::Number(n) => *n,
            BuffInput::Text(s) => s
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| TrainError::InvalidBuff(BuffError::NotNumeric))?,
        };
        BuffFraction::from_percent(percent)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TrainRequest {
    pub tier: String,
    pub unit: String,
    pub amount: i64,
    #[serde(default)]
    pub buff: Option<BuffInput>,
}
