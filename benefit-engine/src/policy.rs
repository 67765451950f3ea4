use rust_decimal::Decimal;

/// Business-tunable benefit policy. Values come from the environment with
/// the production defaults below; they are never inlined at call sites.
#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    /// Qualifying orders required per calendar month (and lifetime, for
    /// card issuance).
    pub order_threshold: i64,
    /// Request creation fails when the card balance is strictly below this
    /// floor. The legacy rule rejects only a negative balance, so the floor
    /// defaults to zero rather than the request fee.
    pub balance_floor: Decimal,
    /// Fee debited per benefit request.
    pub request_fee: Decimal,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self {
            order_threshold: 4,
            balance_floor: Decimal::ZERO,
            request_fee: Decimal::ZERO,
        }
    }
}

impl EligibilityPolicy {
    /// Load the policy from `BENEFIT_ORDER_THRESHOLD`, `BENEFIT_BALANCE_FLOOR`
    /// and `BENEFIT_REQUEST_FEE`, falling back to defaults for unset or
    /// unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            order_threshold: std::env::var("BENEFIT_ORDER_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.order_threshold),
            balance_floor: std::env::var("BENEFIT_BALANCE_FLOOR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.balance_floor),
            request_fee: std::env::var("BENEFIT_REQUEST_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_fee),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_production_rules() {
        let policy = EligibilityPolicy::default();
        assert_eq!(policy.order_threshold, 4);
        assert_eq!(policy.balance_floor, Decimal::ZERO);
        assert_eq!(policy.request_fee, Decimal::ZERO);
    }
}
