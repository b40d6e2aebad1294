// Licensed under the Apache-2.0 license

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How a bus-functional model drives its ready outputs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReadyPolicy {
    #[default]
    Always,
    Never,
    /// Ready on roughly `percent` of edges, re-rolled every edge.
    Random { percent: u8 },
}

impl ReadyPolicy {
    /// Backpressure policy from a ready percentage; 100 and above is
    /// `Always`, 0 is `Never`.
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0 => ReadyPolicy::Never,
            100.. => ReadyPolicy::Always,
            percent => ReadyPolicy::Random { percent },
        }
    }
}

/// Seeded ready generator for one bus-functional model.
pub struct ReadyGen {
    policy: ReadyPolicy,
    rng: StdRng,
}

impl ReadyGen {
    pub fn new(policy: ReadyPolicy, seed: u64) -> Self {
        Self {
            policy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Ready value for one channel on the next edge.
    pub fn roll(&mut self) -> bool {
        match self.policy {
            ReadyPolicy::Always => true,
            ReadyPolicy::Never => false,
            ReadyPolicy::Random { percent } => self.rng.gen_range(0..100u8) < percent,
        }
    }
}
