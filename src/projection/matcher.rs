//! Rule occurrence matching: does a rule fire on a given calendar day?

use super::records::PhaseInfo;
use crate::rule::{Frequency, Rule};
use chrono::{Datelike, NaiveDate};

/// A single firing of a rule on one day
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Raw amount before sign normalization (the phase amount for phased rules)
    pub amount: f64,
    /// Set when the firing came from a payment-schedule phase
    pub phase: Option<PhaseInfo>,
}

/// Decide whether `rule` fires on `date`, and at what raw amount.
///
/// Returns `None` for excluded rules, days outside the rule's active window,
/// and rules that are inert because a required date field is missing. Never
/// fails: malformed inputs suppress the occurrence instead.
pub fn occurrence(rule: &Rule, date: NaiveDate) -> Option<Occurrence> {
    if !rule.included {
        return None;
    }

    // A payment schedule fully supersedes amount/effective_date/end_date.
    if rule.is_phased() {
        return phased_occurrence(rule, date);
    }

    if rule.frequency == Frequency::OneTime {
        // Inert when impact_date is missing.
        return (rule.impact_date? == date).then(|| Occurrence {
            amount: rule.amount,
            phase: None,
        });
    }

    // Recurring rules are inert without an anchor date.
    let effective = rule.effective_date?;
    if date < effective {
        return None;
    }
    if let Some(end) = rule.end_date {
        if date > end {
            return None;
        }
    }

    let days_since_effective = date.signed_duration_since(effective).num_days();
    let fires = match rule.frequency {
        // Same day-of-month as the anchor; anchor days past the end of a
        // short month never fire that month.
        Frequency::Monthly => date.day() == effective.day(),
        Frequency::Weekly => days_since_effective % 7 == 0,
        Frequency::BiWeekly => days_since_effective % 14 == 0,
        Frequency::CustomInterval { interval_days } => {
            interval_days > 0 && days_since_effective % i64::from(interval_days) == 0
        }
        Frequency::OneTime => unreachable!("handled above"),
    };

    fires.then(|| Occurrence {
        amount: rule.amount,
        phase: None,
    })
}

/// First phase in declared order that covers the date wins. A non-finite
/// amount on the selected phase suppresses the day entirely; it does not fall
/// through to later phases.
fn phased_occurrence(rule: &Rule, date: NaiveDate) -> Option<Occurrence> {
    let total = rule.payment_schedule.len();
    let (idx, phase) = rule
        .payment_schedule
        .iter()
        .enumerate()
        .find(|(_, p)| p.covers(date))?;

    if !phase.amount.is_finite() {
        return None;
    }

    Some(Occurrence {
        amount: phase.amount,
        phase: Some(PhaseInfo {
            number: idx + 1,
            total,
            description: phase.description.clone(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{PaymentPhase, RuleType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_rule() -> Rule {
        Rule {
            effective_date: Some(date(2025, 1, 15)),
            ..Rule::new(1, "Rent", -1800.0, RuleType::CashExpense, Frequency::Monthly)
        }
    }

    #[test]
    fn test_excluded_rule_never_matches() {
        let rule = Rule {
            included: false,
            ..monthly_rule()
        };
        assert!(occurrence(&rule, date(2025, 1, 15)).is_none());
    }

    #[test]
    fn test_one_time_fires_only_on_impact_date() {
        let rule = Rule {
            frequency: Frequency::OneTime,
            impact_date: Some(date(2025, 3, 5)),
            ..Rule::new(2, "Deposit", 100.0, RuleType::OneTimeExpense, Frequency::OneTime)
        };
        assert!(occurrence(&rule, date(2025, 3, 5)).is_some());
        assert!(occurrence(&rule, date(2025, 3, 4)).is_none());
        assert!(occurrence(&rule, date(2025, 3, 6)).is_none());
    }

    #[test]
    fn test_one_time_without_impact_date_is_inert() {
        let rule = Rule {
            frequency: Frequency::OneTime,
            impact_date: None,
            ..Rule::new(2, "Deposit", 100.0, RuleType::OneTimeExpense, Frequency::OneTime)
        };
        assert!(occurrence(&rule, date(2025, 3, 5)).is_none());
    }

    #[test]
    fn test_monthly_matches_day_of_month() {
        let rule = monthly_rule();
        assert!(occurrence(&rule, date(2025, 1, 15)).is_some());
        assert!(occurrence(&rule, date(2025, 2, 15)).is_some());
        assert!(occurrence(&rule, date(2025, 2, 14)).is_none());
        // Never before the effective date
        assert!(occurrence(&rule, date(2024, 12, 15)).is_none());
    }

    #[test]
    fn test_monthly_anchor_31_skips_short_months() {
        let rule = Rule {
            effective_date: Some(date(2025, 1, 31)),
            ..monthly_rule()
        };
        assert!(occurrence(&rule, date(2025, 1, 31)).is_some());
        // February and April have no day 31: the rule never fires there.
        for day in 1..=28 {
            assert!(occurrence(&rule, date(2025, 2, day)).is_none());
        }
        for day in 1..=30 {
            assert!(occurrence(&rule, date(2025, 4, day)).is_none());
        }
        assert!(occurrence(&rule, date(2025, 3, 31)).is_some());
    }

    #[test]
    fn test_weekly_and_biweekly_cadence() {
        let weekly = Rule {
            frequency: Frequency::Weekly,
            ..monthly_rule()
        };
        assert!(occurrence(&weekly, date(2025, 1, 15)).is_some());
        assert!(occurrence(&weekly, date(2025, 1, 22)).is_some());
        assert!(occurrence(&weekly, date(2025, 1, 23)).is_none());

        let biweekly = Rule {
            frequency: Frequency::BiWeekly,
            ..monthly_rule()
        };
        assert!(occurrence(&biweekly, date(2025, 1, 15)).is_some());
        assert!(occurrence(&biweekly, date(2025, 1, 22)).is_none());
        assert!(occurrence(&biweekly, date(2025, 1, 29)).is_some());
    }

    #[test]
    fn test_custom_interval() {
        let rule = Rule {
            frequency: Frequency::CustomInterval { interval_days: 10 },
            ..monthly_rule()
        };
        assert!(occurrence(&rule, date(2025, 1, 15)).is_some());
        assert!(occurrence(&rule, date(2025, 1, 25)).is_some());
        assert!(occurrence(&rule, date(2025, 1, 24)).is_none());

        // Degenerate zero-day interval never fires.
        let inert = Rule {
            frequency: Frequency::CustomInterval { interval_days: 0 },
            ..monthly_rule()
        };
        assert!(occurrence(&inert, date(2025, 1, 15)).is_none());
    }

    #[test]
    fn test_end_date_is_inclusive() {
        let rule = Rule {
            frequency: Frequency::Weekly,
            end_date: Some(date(2025, 1, 29)),
            ..monthly_rule()
        };
        assert!(occurrence(&rule, date(2025, 1, 29)).is_some());
        assert!(occurrence(&rule, date(2025, 2, 5)).is_none());
    }

    #[test]
    fn test_recurring_without_effective_date_is_inert() {
        let rule = Rule {
            effective_date: None,
            ..monthly_rule()
        };
        assert!(occurrence(&rule, date(2025, 1, 15)).is_none());
    }

    fn phased_rule() -> Rule {
        Rule {
            payment_schedule: vec![
                PaymentPhase {
                    amount: 1000.0,
                    start_date: date(2025, 1, 1),
                    end_date: Some(date(2025, 1, 31)),
                    description: "Phase one".to_string(),
                },
                PaymentPhase {
                    amount: 500.0,
                    start_date: date(2025, 2, 1),
                    end_date: None,
                    description: "Phase two".to_string(),
                },
            ],
            ..Rule::new(3, "Consulting", 0.0, RuleType::Income, Frequency::Monthly)
        }
    }

    #[test]
    fn test_phased_rule_selects_covering_phase() {
        let rule = phased_rule();

        let jan = occurrence(&rule, date(2025, 1, 20)).expect("phase one should cover January");
        assert_eq!(jan.amount, 1000.0);
        let info = jan.phase.expect("phase info expected");
        assert_eq!(info.number, 1);
        assert_eq!(info.total, 2);

        let mar = occurrence(&rule, date(2025, 3, 10)).expect("open phase two covers March");
        assert_eq!(mar.amount, 500.0);
        assert_eq!(mar.phase.unwrap().number, 2);

        assert!(occurrence(&rule, date(2024, 12, 31)).is_none());
    }

    #[test]
    fn test_overlapping_phases_first_in_order_wins() {
        let mut rule = phased_rule();
        rule.payment_schedule[1].start_date = date(2025, 1, 15); // overlaps phase one
        let occ = occurrence(&rule, date(2025, 1, 20)).unwrap();
        assert_eq!(occ.amount, 1000.0);
        assert_eq!(occ.phase.unwrap().number, 1);
    }

    #[test]
    fn test_non_finite_phase_amount_suppresses_day() {
        let mut rule = phased_rule();
        rule.payment_schedule[0].amount = f64::NAN;
        // The covering phase is malformed: no occurrence, no fall-through.
        assert!(occurrence(&rule, date(2025, 1, 20)).is_none());
        // Later phases still fire on their own dates.
        assert!(occurrence(&rule, date(2025, 2, 10)).is_some());
    }
}
