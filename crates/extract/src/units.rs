/// Magnitude suffix that may follow a price figure ("5 million", "20 lakh", "500k").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Rupees,
    Thousand,
    Lakh,
    Million,
}

impl Unit {
    /// Unknown tokens fall back to plain rupees.
    pub fn from_token(token: Option<&str>) -> Self {
        let Some(token) = token else {
            return Unit::Rupees;
        };
        match token.trim().to_lowercase().as_str() {
            "m" | "mil" | "million" => Unit::Million,
            "l" | "lakh" => Unit::Lakh,
            "k" | "thousand" => Unit::Thousand,
            _ => Unit::Rupees,
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Unit::Rupees => 1.0,
            Unit::Thousand => 1_000.0,
            Unit::Lakh => 100_000.0,
            Unit::Million => 1_000_000.0,
        }
    }
}

/// Multiplier for an optional suffix token.
pub fn multiplier(token: Option<&str>) -> f64 {
    Unit::from_token(token).multiplier()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_suffixes() {
        assert_eq!(multiplier(Some("M")), 1_000_000.0);
        assert_eq!(multiplier(Some("mil")), 1_000_000.0);
        assert_eq!(multiplier(Some("lakh")), 100_000.0);
        assert_eq!(multiplier(Some("l")), 100_000.0);
        assert_eq!(multiplier(Some("Thousand")), 1_000.0);
    }

    #[test]
    fn test_absent_rs_and_unknown_are_unit() {
        assert_eq!(multiplier(None), 1.0);
        assert_eq!(multiplier(Some("rs")), 1.0);
        assert_eq!(multiplier(Some("crore")), 1.0);
    }
}
