use std::time::Duration;

use textback_core::traits::DelayProvider;

/// `min + (random byte % spread)` seconds; 2..=4 s by default.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    min: Duration,
    spread: u8,
}

impl RandomDelay {
    pub fn new(min_secs: u64, spread: u8) -> Self {
        Self { min: Duration::from_secs(min_secs), spread: spread.max(1) }
    }

    pub fn delay_for_byte(&self, byte: u8) -> Duration {
        self.min + Duration::from_secs(u64::from(byte % self.spread))
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(2, 3)
    }
}

impl DelayProvider for RandomDelay {
    fn next_delay(&mut self) -> Duration {
        self.delay_for_byte(rand::random::<u8>())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay(pub Duration);

impl DelayProvider for FixedDelay {
    fn next_delay(&mut self) -> Duration {
        self.0
    }
}
