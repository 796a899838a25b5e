// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for the envelope decoder and the facade read path.
// Run with: cargo +nightly fuzz run fuzz_envelope
//
// Any backend string, however mangled, must decode to one of the three
// envelope cases and read back through every typed accessor without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use metastash::envelope::{decode_envelope, Envelope};
use metastash::{InMemoryBackend, ManualClock, MetaStash, ScopedBackends, StashConfig, StorageBackend};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if raw.len() > 4096 {
        return;
    }

    if let Envelope::WithMeta { payload, .. } = decode_envelope(raw) {
        assert!(!payload.is_empty());
    }

    let backend = InMemoryBackend::new();
    backend.set("k", raw).unwrap();
    let stash = MetaStash::new(
        StashConfig::default().with_expire(1_000),
        &ScopedBackends::new().with_durable(backend),
    )
    .unwrap()
    .with_clock(ManualClock::new(u64::MAX / 2));

    let _ = stash.get_string("k");
    let _ = stash.get_number("k");
    let _ = stash.get_json::<serde_json::Value>("k", None);
});
