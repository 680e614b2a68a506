/// Validation failures for a training order. The Display text is what the
/// caller gets back as its reply.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("Amount must be a positive integer.")]
    InvalidAmount,

    #[error("{0}")]
    InvalidBuff(BuffError),

    #[error("Costs for tier `{0}` are not defined yet. Provide base numbers to add support.")]
    UnknownTier(String),

    #[error("Unknown unit `{unit}` for {tier}. Valid: {}", .valid.join(", "))]
    UnknownUnit {
        tier: String,
        unit: String,
        valid: Vec<&'static str>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuffError {
    #[error("Buff must be a number (percentage), e.g. 45 for 45%")]
    NotNumeric,

    #[error("Buff percentage must be between 0 and 100.")]
    OutOfRange,
}
