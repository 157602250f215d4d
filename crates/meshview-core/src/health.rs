use serde_json::Value;

/// Sentinel health meaning "no data observed", distinguishable from a
/// perfect score of 1.0.
pub const NO_DATA_HEALTH: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub is_error: bool,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthAggregate {
    pub health: f64,
    pub has_data: bool,
}

impl HealthAggregate {
    pub const NO_DATA: Self = Self {
        health: NO_DATA_HEALTH,
        has_data: false,
    };
}

/// Fold request outcomes into an error-free ratio in [0, 1], or the no-data
/// sentinel when the input carries no requests at all.
pub fn aggregate(outcomes: impl IntoIterator<Item = RequestOutcome>) -> HealthAggregate {
    let mut total: u64 = 0;
    let mut errors: u64 = 0;
    for outcome in outcomes {
        total += outcome.count;
        if outcome.is_error {
            errors += outcome.count;
        }
    }
    if total == 0 {
        return HealthAggregate::NO_DATA;
    }
    HealthAggregate {
        health: 1.0 - errors as f64 / total as f64,
        has_data: true,
    }
}

/// Adapt raw metrics rows into request outcomes. A row is a tuple whose
/// second column is the HTTP status class and sixth the request count;
/// malformed rows are skipped rather than failing the whole fetch.
pub fn outcomes_from_rows(rows: &[Value]) -> Vec<RequestOutcome> {
    rows.iter()
        .filter_map(|row| {
            let cells = row.as_array()?;
            let status_class = cells.get(1)?.as_str()?;
            let count = cells.get(5)?.as_u64()?;
            Some(RequestOutcome {
                is_error: status_class == "5xx",
                count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outcome(is_error: bool, count: u64) -> RequestOutcome {
        RequestOutcome { is_error, count }
    }

    #[test]
    fn empty_input_yields_no_data_sentinel() {
        let health = aggregate([]);
        assert_eq!(health.health, -1.0);
        assert!(!health.has_data);
    }

    #[test]
    fn error_free_traffic_is_perfectly_healthy() {
        let health = aggregate([outcome(false, 10)]);
        assert_eq!(health.health, 1.0);
        assert!(health.has_data);
    }

    #[test]
    fn mixed_traffic_yields_error_free_ratio() {
        let health = aggregate([outcome(true, 3), outcome(false, 7)]);
        assert_eq!(health.health, 0.7);
        assert!(health.has_data);
    }

    #[test]
    fn zero_count_outcomes_carry_no_data() {
        let health = aggregate([outcome(true, 0), outcome(false, 0)]);
        assert!(!health.has_data);
        assert_eq!(health.health, -1.0);
    }

    #[test]
    fn appending_successes_never_lowers_health() {
        let base = aggregate([outcome(true, 3), outcome(false, 7)]);
        let extended = aggregate([outcome(true, 3), outcome(false, 7), outcome(false, 90)]);
        assert!(extended.health >= base.health);
    }

    #[test]
    fn appending_errors_never_raises_health() {
        let base = aggregate([outcome(true, 3), outcome(false, 7)]);
        let extended = aggregate([outcome(true, 3), outcome(false, 7), outcome(true, 90)]);
        assert!(extended.health <= base.health);
    }

    #[test]
    fn adapts_metrics_rows_and_skips_malformed_ones() {
        let rows = vec![
            json!(["pet-be", "5xx", "GET", "controller", "gateway", 3]),
            json!(["pet-be", "2xx", "GET", "controller", "gateway", 7]),
            json!({"not": "a row"}),
            json!(["short"]),
            json!(["pet-be", "2xx", "GET", "controller", "gateway", "not-a-count"]),
        ];
        let outcomes = outcomes_from_rows(&rows);
        assert_eq!(outcomes, vec![outcome(true, 3), outcome(false, 7)]);
        let health = aggregate(outcomes);
        assert_eq!(health.health, 0.7);
    }
}
