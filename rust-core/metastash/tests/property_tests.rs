// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for the MetaStash facade

use proptest::prelude::*;
use metastash::{
    InMemoryBackend, ManualClock, MetaStash, ScopedBackends, StashConfig, StorageBackend,
};

/// Generate arbitrary caller keys
fn arb_key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.:-]{1,24}"
}

/// Generate arbitrary printable values
fn arb_value() -> impl Strategy<Value = String> {
    "\\PC{0,64}"
}

/// Generate arbitrary non-empty prefixes
fn arb_prefix() -> impl Strategy<Value = String> {
    "[a-z]{1,6}:"
}

fn stash_with(config: StashConfig, backend: &InMemoryBackend, clock: &ManualClock) -> MetaStash {
    MetaStash::new(config, &ScopedBackends::new().with_durable(backend.clone()))
        .unwrap()
        .with_clock(clock.clone())
}

proptest! {
    #[test]
    fn test_string_round_trip(key in arb_key(), value in arb_value(), has_meta in any::<bool>()) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        let stash = stash_with(StashConfig::default().with_meta(has_meta), &backend, &clock);

        stash.set_string(&key, &value).unwrap();
        prop_assert_eq!(stash.get_string(&key).unwrap(), value);
    }

    #[test]
    fn test_values_containing_separator_survive(head in arb_value(), tail in arb_value()) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        let stash = stash_with(StashConfig::default(), &backend, &clock);

        let value = format!("{head}{}{tail}", metastash::SEPARATOR);
        stash.set_string("k", &value).unwrap();
        prop_assert_eq!(stash.get_string("k").unwrap(), value);
    }

    #[test]
    fn test_prefixes_isolate(
        key in arb_key(),
        prefix_a in arb_prefix(),
        prefix_b in arb_prefix(),
        value_a in "[a-z]{1,16}",
        value_b in "[A-Z]{1,16}",
    ) {
        prop_assume!(prefix_a != prefix_b);
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        let a = stash_with(StashConfig::default().with_prefix(prefix_a.clone()), &backend, &clock);
        let b = stash_with(StashConfig::default().with_prefix(prefix_b.clone()), &backend, &clock);

        a.set_string(&key, &value_a).unwrap();
        prop_assert_eq!(b.get_string_opt(&key).unwrap(), None);

        b.set_string(&key, &value_b).unwrap();
        prop_assert_eq!(a.get_string(&key).unwrap(), value_a);
        prop_assert_eq!(b.get_string(&key).unwrap(), value_b);
        let key_a = format!("{prefix_a}{key}");
        let key_b = format!("{prefix_b}{key}");
        prop_assert!(backend.contains_key(&key_a));
        prop_assert!(backend.contains_key(&key_b));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive(ttl in 1u64..10_000_000, start in 1u64..1_000_000_000_000) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(start);
        let stash = stash_with(StashConfig::default().with_expire(ttl), &backend, &clock);

        stash.set_string("k", "v").unwrap();

        clock.set(start + ttl - 1);
        prop_assert_eq!(stash.get_string("k").unwrap(), "v");

        clock.set(start + ttl);
        prop_assert_eq!(stash.get_string_opt("k").unwrap(), None);
        prop_assert_eq!(backend.get("k").unwrap(), None);
    }

    #[test]
    fn test_never_expire_survives_any_delay(delay in any::<u32>()) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        let stash = stash_with(StashConfig::default(), &backend, &clock);

        stash.set_number("n", 3.5).unwrap();
        clock.advance(u64::from(delay) * 1_000);
        prop_assert_eq!(stash.get_number("n").unwrap(), Some(3.5));
    }

    #[test]
    fn test_finite_numbers_round_trip(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let backend = InMemoryBackend::new();
        let clock = ManualClock::new(1_000);
        let stash = stash_with(StashConfig::default(), &backend, &clock);

        stash.set_number("n", value).unwrap();
        // -0 is stored as 0, which compares equal.
        prop_assert_eq!(stash.get_number("n").unwrap(), Some(value));
    }
}
