/// Result of one delivery attempt, returned by value.
///
/// The upstream buffering engine branches on the variant: `RetryableFailure`
/// re-enqueues the chunk, `Delivered` and `Dropped` both discard it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    RetryableFailure(String),
    Dropped(String),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableFailure(_))
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Delivered => None,
            Self::RetryableFailure(reason) | Self::Dropped(reason) => Some(reason),
        }
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => f.write_str("delivered"),
            Self::RetryableFailure(reason) => write!(f, "retryable failure: {reason}"),
            Self::Dropped(reason) => write!(f, "dropped: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert!(DeliveryOutcome::Delivered.is_delivered());
        assert!(DeliveryOutcome::Delivered.reason().is_none());

        let retry = DeliveryOutcome::RetryableFailure("server returned status 500".to_string());
        assert!(retry.is_retryable());
        assert_eq!(retry.reason(), Some("server returned status 500"));

        let dropped = DeliveryOutcome::Dropped("server returned status 404".to_string());
        assert!(dropped.is_dropped());
        assert!(!dropped.is_retryable());
    }
}
