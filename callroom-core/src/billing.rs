//! Per-minute metering of connected call time.
//!
//! Cost is billed in whole started minutes: any call that reached media
//! pays at least one minute, and neither duration nor cost ever decreases.

use crate::model::EndReport;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const NANOS_PER_MINUTE: u128 = 60_000_000_000;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillingSnapshot {
    pub duration_secs: u64,
    pub cost: u64,
}

impl From<BillingSnapshot> for EndReport {
    fn from(snapshot: BillingSnapshot) -> Self {
        EndReport {
            duration_secs: snapshot.duration_secs,
            cost: snapshot.cost,
        }
    }
}

/// `ceil(elapsed / 60s) * rate_per_minute`, computed on the exact elapsed time.
pub fn cost_for(elapsed: Duration, rate_per_minute: u64) -> u64 {
    let minutes = elapsed.as_nanos().div_ceil(NANOS_PER_MINUTE);
    u64::try_from(minutes)
        .unwrap_or(u64::MAX)
        .saturating_mul(rate_per_minute)
}

#[derive(Debug, Clone)]
pub struct Meter {
    rate_per_minute: u64,
    started_at: Option<Instant>,
    last: BillingSnapshot,
    finalized: bool,
}

impl Meter {
    pub fn new(rate_per_minute: u64) -> Self {
        Self {
            rate_per_minute,
            started_at: None,
            last: BillingSnapshot::default(),
            finalized: false,
        }
    }

    pub fn rate_per_minute(&self) -> u64 {
        self.rate_per_minute
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.finalized
    }

    /// Records the start instant. Returns `false` if already started or finalized.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.finalized || self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    /// Recomputes duration and cost. `None` before `start` and after `finalize`.
    ///
    /// A started meter never reports less than one minute.
    pub fn tick(&mut self, now: Instant) -> Option<BillingSnapshot> {
        if self.finalized {
            return None;
        }
        let started_at = self.started_at?;
        let elapsed = now.saturating_duration_since(started_at);

        let next = BillingSnapshot {
            duration_secs: elapsed.as_secs().max(self.last.duration_secs),
            cost: cost_for(elapsed, self.rate_per_minute)
                .max(self.rate_per_minute)
                .max(self.last.cost),
        };
        self.last = next;
        Some(next)
    }

    pub fn snapshot(&self) -> BillingSnapshot {
        self.last
    }

    /// Takes a last reading and freezes the meter. Repeated calls return the frozen snapshot.
    pub fn finalize(&mut self, now: Instant) -> BillingSnapshot {
        if !self.finalized {
            self.tick(now);
            self.finalized = true;
        }
        self.last
    }
}
