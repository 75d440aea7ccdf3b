//! Trapdoor lifecycle: revoke expired/over-used trapdoors, reset per-epoch
//! counters. Structured as an "assess state, decide action" policy module,
//! where the input state is a trapdoor's age/usage rather than a threat
//! score.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::Trapdoor;

/// Outcome of one `rotate` pass, reported back so the caller can emit an
/// `IndexEvent::TrapdoorsRotated` audit event with real counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationSummary {
    pub revoked: usize,
    pub usage_reset: usize,
}

/// Stateless rotation policy: no fields, pure functions over a trapdoor
/// map, mirroring `PolicyAdapter`'s unit-struct-with-static-methods shape.
pub struct TrapdoorPolicy;

impl TrapdoorPolicy {
    /// Marks expired trapdoors revoked; resets the usage counter on
    /// trapdoors that hit `max_usage` but haven't expired (`spec.md` §4.8:
    /// "rotate_trapdoors marks expired ones revoked and resets usage on
    /// over-used ones").
    pub fn rotate(trapdoors: &mut HashMap<String, Trapdoor>, now: DateTime<Utc>) -> RotationSummary {
        let mut summary = RotationSummary::default();
        for trapdoor in trapdoors.values_mut() {
            if trapdoor.revoked {
                continue;
            }
            if now >= trapdoor.expires_at {
                trapdoor.revoked = true;
                summary.revoked += 1;
            } else if trapdoor.usage_count >= trapdoor.max_usage {
                trapdoor.usage_count = 0;
                summary.usage_reset += 1;
            }
        }
        summary
    }

    /// Drops trapdoors that have been revoked for longer than one epoch
    /// duration's worth of slack, keeping the map from growing unbounded
    /// across very long-running processes. Not required by `spec.md`
    /// directly, but named by the "cleanup expired trapdoors" step of the
    /// epoch tick description in §4.8.
    pub fn sweep(trapdoors: &mut HashMap<String, Trapdoor>, now: DateTime<Utc>, grace: chrono::Duration) {
        trapdoors.retain(|_, t| !(t.revoked && now - t.expires_at > grace));
    }
}
