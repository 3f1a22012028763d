//! Alert policy: pure mapping from evaluation results to alert events.
//!
//! Every check is evaluated independently; a run emits all alerts that apply.

use super::ratio::CollateralRatio;
use super::state_tracker::ChangeResult;
use crate::domain::{AlertEvent, AlertKind, Decimal, Severity};

/// User-chosen bounds the position is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_ratio: Decimal,
    pub max_ratio: Decimal,
    /// Minimum collateral (ETH) that should be redeemed before this position.
    pub redemption_buffer: Decimal,
}

/// Unconditional summary sent when a notification is forced.
pub fn health_summary(price: Decimal, ratio: CollateralRatio) -> AlertEvent {
    AlertEvent::new(
        AlertKind::HealthSummary,
        format!(
            "Trove Health Summary\nETH price: ${}\nTrove Collateral Ratio: {}%",
            price.round_dp(0),
            ratio.display_percent()
        ),
        Severity::Normal,
    )
}

/// Alerts for a ratio outside `[min_ratio, max_ratio]`. Both bounds are
/// inclusive: a ratio exactly on a bound raises nothing.
pub fn ratio_alerts(ratio: CollateralRatio, thresholds: &Thresholds) -> Vec<AlertEvent> {
    let mut alerts = Vec::new();
    let value = ratio.value();

    if value < thresholds.min_ratio {
        alerts.push(AlertEvent::new(
            AlertKind::RatioBelowMinimum,
            format!(
                "Your collateral ratio is below {}%",
                thresholds.min_ratio.as_percent()
            ),
            Severity::High,
        ));
    }
    if value > thresholds.max_ratio {
        alerts.push(AlertEvent::new(
            AlertKind::RatioAboveMaximum,
            format!(
                "Your collateral ratio is above {}%",
                thresholds.max_ratio.as_percent()
            ),
            Severity::Normal,
        ));
    }

    alerts
}

/// Alert when less collateral than the buffer would be redeemed first.
pub fn redemption_alert(exposure: Decimal, thresholds: &Thresholds) -> Option<AlertEvent> {
    if exposure >= thresholds.redemption_buffer {
        return None;
    }
    Some(AlertEvent::new(
        AlertKind::RedemptionRisk,
        format!(
            "Your trove is at risk of getting redeemed. The troves ahead for redemption have a collateral of {} ETH",
            exposure.round_dp(0)
        ),
        Severity::High,
    ))
}

/// Alert when the position changed between runs.
pub fn mutation_alert(change: &ChangeResult) -> Option<AlertEvent> {
    if !change.is_modified() {
        return None;
    }
    Some(AlertEvent::new(
        AlertKind::PositionModified,
        "Your trove's debt and/or collateral were modified",
        Severity::High,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionSnapshot;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn thresholds() -> Thresholds {
        Thresholds {
            min_ratio: d("1.10"),
            max_ratio: d("3.0"),
            redemption_buffer: d("5"),
        }
    }

    fn ratio(s: &str) -> CollateralRatio {
        CollateralRatio::new(d(s))
    }

    #[test]
    fn test_ratio_within_bounds_is_quiet() {
        assert!(ratio_alerts(ratio("2.0"), &thresholds()).is_empty());
    }

    #[test]
    fn test_ratio_on_bounds_is_quiet() {
        assert!(ratio_alerts(ratio("1.1"), &thresholds()).is_empty());
        assert!(ratio_alerts(ratio("3"), &thresholds()).is_empty());
    }

    #[test]
    fn test_ratio_below_minimum() {
        let alerts = ratio_alerts(ratio("1.0999"), &thresholds());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::RatioBelowMinimum);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].body, "Your collateral ratio is below 110%");
        assert_eq!(alerts[0].title, "Liquity Trove Management");
    }

    #[test]
    fn test_ratio_above_maximum() {
        let alerts = ratio_alerts(ratio("3.01"), &thresholds());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::RatioAboveMaximum);
        assert_eq!(alerts[0].severity, Severity::Normal);
        assert_eq!(alerts[0].body, "Your collateral ratio is above 300%");
    }

    #[test]
    fn test_inverted_thresholds_emit_both() {
        let t = Thresholds {
            min_ratio: d("2"),
            max_ratio: d("1"),
            redemption_buffer: d("0"),
        };
        let alerts = ratio_alerts(ratio("1.5"), &t);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn test_redemption_alert_below_buffer() {
        let alert = redemption_alert(d("3"), &thresholds()).unwrap();
        assert_eq!(alert.kind, AlertKind::RedemptionRisk);
        assert_eq!(alert.severity, Severity::High);
        assert!(alert.body.contains("3 ETH"), "body: {}", alert.body);
    }

    #[test]
    fn test_redemption_alert_at_or_above_buffer_is_quiet() {
        assert!(redemption_alert(d("5"), &thresholds()).is_none());
        assert!(redemption_alert(d("120.7"), &thresholds()).is_none());
    }

    #[test]
    fn test_redemption_alert_rounds_amount() {
        let alert = redemption_alert(d("2.6"), &thresholds()).unwrap();
        assert!(alert.body.ends_with("collateral of 3 ETH"));
    }

    #[test]
    fn test_mutation_alert_only_when_modified() {
        assert!(mutation_alert(&ChangeResult::Unmodified).is_none());
        assert!(mutation_alert(&ChangeResult::FirstObservation).is_none());
        assert!(mutation_alert(&ChangeResult::PositionAbsent).is_none());
        let alert = mutation_alert(&ChangeResult::Modified {
            previous: PositionSnapshot::new(1, 1),
            current: PositionSnapshot::new(1, 2),
        })
        .unwrap();
        assert_eq!(alert.kind, AlertKind::PositionModified);
        assert_eq!(alert.severity, Severity::High);
    }

    #[test]
    fn test_health_summary_text() {
        let alert = health_summary(d("2000.4"), ratio("1.995"));
        assert_eq!(
            alert.body,
            "Trove Health Summary\nETH price: $2000\nTrove Collateral Ratio: 200%"
        );
        assert_eq!(alert.severity, Severity::Normal);
    }

    #[test]
    fn test_each_kind_has_distinct_template() {
        let t = thresholds();
        let mut bodies = vec![
            health_summary(d("1"), ratio("1")).body,
            redemption_alert(d("0"), &t).unwrap().body,
            mutation_alert(&ChangeResult::Modified {
                previous: PositionSnapshot::new(1, 1),
                current: PositionSnapshot::new(2, 1),
            })
            .unwrap()
            .body,
        ];
        bodies.extend(ratio_alerts(ratio("0.5"), &t).into_iter().map(|a| a.body));
        bodies.extend(ratio_alerts(ratio("9"), &t).into_iter().map(|a| a.body));
        let count = bodies.len();
        bodies.sort();
        bodies.dedup();
        assert_eq!(bodies.len(), count);
    }
}
