//! Retransmission suppression for request identifiers.
//!
//! A NAS that gives up waiting for a reply retransmits the same request
//! with the same identifier. Two sightings of an identifier inside the
//! window are one request; outside the window the identifier has wrapped
//! around the 8-bit space and counts as new traffic.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// How long a repeated identifier counts as a retransmission.
pub const REPLAY_WINDOW: Duration = Duration::from_secs(2);

/// Tracks recently seen request identifiers for a single NAS.
///
/// One guard per NAS: sharing a guard would let one NAS mask another's
/// retransmissions when their identifier sequences collide. Entries are
/// never evicted; the identifier space bounds a guard at 256 entries.
#[derive(Debug, Default)]
pub struct ReplayGuard {
    seen: DashMap<u8, Instant>,
}

impl ReplayGuard {
    pub fn new() -> Self {
        ReplayGuard {
            seen: DashMap::new(),
        }
    }

    /// Whether a request with this identifier should be processed.
    ///
    /// True when the identifier is unseen or last seen longer than
    /// [`REPLAY_WINDOW`] ago; the recorded timestamp moves forward only in
    /// those cases, so a suppressed retransmission does not extend its own
    /// suppression.
    pub fn check(&self, identifier: u8) -> bool {
        self.check_at(identifier, Instant::now())
    }

    /// `check` against a caller-supplied clock reading.
    pub fn check_at(&self, identifier: u8, now: Instant) -> bool {
        match self.seen.entry(identifier) {
            Entry::Occupied(mut entry) => {
                if now.duration_since(*entry.get()) > REPLAY_WINDOW {
                    entry.insert(now);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(now);
                true
            }
        }
    }

    /// Number of identifiers on record.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no identifier has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
