use crate::{DEFAULT_MAX_ATTEMPTS, ReconnectPolicy, ReconnectRegime};

use std::time::Duration;

#[test]
fn given_default_policy_when_attempts_grow_then_delays_double_up_to_cap() {
    let policy = ReconnectPolicy::default();

    let delays: Vec<u64> = (1..=7)
        .map(|attempts| policy.backoff_delay(attempts).as_secs())
        .collect();

    assert_eq!(delays, vec![5, 10, 20, 40, 80, 160, 300]);
}

#[test]
fn given_attempts_past_the_exponent_ceiling_when_delay_computed_then_stays_capped() {
    let policy = ReconnectPolicy::default();

    assert_eq!(policy.backoff_delay(8), Duration::from_secs(300));
    assert_eq!(policy.backoff_delay(100), Duration::from_secs(300));
    assert_eq!(policy.backoff_delay(u32::MAX), Duration::from_secs(300));
}

#[test]
fn given_attempts_within_max_when_regime_checked_then_short_term() {
    let policy = ReconnectPolicy::default();

    for attempts in 1..=DEFAULT_MAX_ATTEMPTS {
        assert_eq!(
            policy.regime(attempts, DEFAULT_MAX_ATTEMPTS),
            ReconnectRegime::ShortTerm
        );
    }
}

#[test]
fn given_attempts_past_max_when_delay_computed_then_fixed_long_term_interval() {
    let policy = ReconnectPolicy::default();

    // Long-term regime never grows further: fixed 300s forever.
    assert_eq!(
        policy.regime(DEFAULT_MAX_ATTEMPTS + 1, DEFAULT_MAX_ATTEMPTS),
        ReconnectRegime::LongTerm
    );
    assert_eq!(
        policy.delay(DEFAULT_MAX_ATTEMPTS + 1, DEFAULT_MAX_ATTEMPTS),
        Duration::from_secs(300)
    );
    assert_eq!(
        policy.delay(DEFAULT_MAX_ATTEMPTS + 50, DEFAULT_MAX_ATTEMPTS),
        Duration::from_secs(300)
    );
}

#[test]
fn given_profile_with_higher_max_attempts_when_within_bound_then_backoff_applies() {
    let policy = ReconnectPolicy::default();

    assert_eq!(policy.delay(5, 10), Duration::from_secs(80));
    assert_eq!(policy.delay(11, 10), Duration::from_secs(300));
}
