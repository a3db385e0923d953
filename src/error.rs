/// Estimator errors.
///
/// Every variant is raised before the first draw; a run that starts sampling
/// always completes (or is cancelled, which is not an error).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimateError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

impl EstimateError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type EstimateResult<T> = Result<T, EstimateError>;

/// Reject NaN and ±∞ with the parameter name in the message.
pub(crate) fn require_finite(name: &str, value: f64) -> EstimateResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EstimateError::invalid(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_finite() {
        assert_eq!(require_finite("mu", 1.5), Ok(1.5));
        let err = require_finite("sigma", f64::NAN).unwrap_err();
        assert!(err.to_string().contains("sigma must be finite"), "{err}");
        assert!(require_finite("threshold", f64::NEG_INFINITY).is_err());
    }
}
