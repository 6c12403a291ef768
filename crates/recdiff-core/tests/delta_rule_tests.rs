#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::prelude::*;
use recdiff_core::{DeltaMode, DeltaRule, DiffError};

fn magnitude() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..1000, 0u32..1000).prop_map(|(i, f)| format!("{}.{}", i, f)),
    ]
}

fn expression() -> impl Strategy<Value = String> {
    (
        proptest::option::of(magnitude()),
        magnitude(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(x, y, sign, inclusive, percent)| {
            if sign {
                return "+-".to_string();
            }
            format!(
                "+{}-{}{}{}",
                x.unwrap_or_default(),
                y,
                if inclusive { "=" } else { "" },
                if percent { "%" } else { "" }
            )
        })
}

fn sample_value() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), -1.0e6..1.0e6f64]
}

proptest! {
    #[test]
    fn rendered_rule_reparses_to_same_predicate(
        expr in expression(),
        pairs in proptest::collection::vec((sample_value(), sample_value()), 1..20),
    ) {
        let rule = DeltaRule::parse(&expr).unwrap();
        let reparsed: DeltaRule = rule.to_string().parse().unwrap();
        prop_assert_eq!(&reparsed, &rule);
        for (old, new) in pairs {
            prop_assert_eq!(rule.matches(old, new), reparsed.matches(old, new));
        }
    }

    #[test]
    fn sign_rule_matches_only_strict_flips(old in sample_value(), new in sample_value()) {
        let rule = DeltaRule::parse("+-").unwrap();
        prop_assert_eq!(rule.matches(old, new), old * new < 0.0);
    }

    #[test]
    fn symmetric_threshold_matches_abs_delta(
        threshold in 0u32..100,
        old in -1000i32..1000,
        new in -1000i32..1000,
    ) {
        let rule = DeltaRule::parse(&format!("+-{}", threshold)).unwrap();
        let delta = (new - old).abs() as u32;
        prop_assert_eq!(rule.matches(old as f64, new as f64), delta > threshold);
    }

    #[test]
    fn percent_on_zero_base_never_matches(expr in expression(), new in sample_value()) {
        let rule = DeltaRule::parse(&expr).unwrap();
        if rule.mode() == DeltaMode::Percent {
            prop_assert!(!rule.matches(0.0, new));
        }
    }

    #[test]
    fn x_without_y_always_rejected(x in magnitude()) {
        let expr = format!("+{}-", x);
        prop_assert_eq!(
            DeltaRule::parse(&expr),
            Err(DiffError::AsymmetricDelta { expr: expr.clone() })
        );
    }
}

#[test]
fn test_spec_examples() {
    let sign = DeltaRule::parse("+-").unwrap();
    assert!(sign.matches(-1.0, 1.0));
    assert!(sign.matches(1.0, -1.0));
    assert!(!sign.matches(1.0, 2.0));
    assert!(!sign.matches(0.0, 5.0));

    let five = DeltaRule::parse("+-5").unwrap();
    assert!(five.matches(10.0, 16.0));
    assert!(!five.matches(10.0, 15.0));
    assert!(DeltaRule::parse("+-5=").unwrap().matches(10.0, 15.0));

    let asym = DeltaRule::parse("+3-7").unwrap();
    assert!(asym.matches(10.0, 14.0));
    assert!(asym.matches(10.0, 2.0));
    assert!(!asym.matches(10.0, 9.0));

    assert!(!DeltaRule::parse("+-10%").unwrap().matches(0.0, 100.0));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        DeltaRule::parse("x").unwrap_err().to_string(),
        "Bad syntax for delta 'x'"
    );
    assert_eq!(
        DeltaRule::parse("+7-").unwrap_err().to_string(),
        "Bad syntax for delta '+7-': +X-"
    );
    assert_eq!(
        DeltaRule::parse("+-1%%").unwrap_err().to_string(),
        "Junk at end of delta '+-1%%': %"
    );
}
