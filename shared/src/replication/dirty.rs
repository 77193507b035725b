use crate::{tick::ticks_elapsed, types::Tick};

const MAX_INTERVAL_TICKS: u16 = i16::MAX as u16;

/// Minimum and maximum spacing between two transmissions of one variable,
/// in ticks of the logical network clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendCadence {
    /// A variable never sends twice within this many ticks
    pub min_interval: u16,
    /// A variable with any pending change sends once this many ticks have
    /// passed, even if the change is below its dirtiness threshold
    pub max_interval: Option<u16>,
}

impl SendCadence {
    pub fn new(min_interval: u16, max_interval: Option<u16>) -> Self {
        Self {
            min_interval: min_interval.min(MAX_INTERVAL_TICKS),
            max_interval: max_interval.map(|max| max.min(MAX_INTERVAL_TICKS)),
        }
    }

    /// Send on every tick a change is pending
    pub fn every_tick() -> Self {
        Self::new(0, None)
    }
}

impl Default for SendCadence {
    fn default() -> Self {
        Self::every_tick()
    }
}

/// Tracks the dirty flag and last send time of one variable and applies its
/// `SendCadence`
#[derive(Clone, Debug)]
pub struct DirtyTracker {
    cadence: SendCadence,
    dirty: bool,
    last_sent: Option<Tick>,
}

impl DirtyTracker {
    pub fn new(cadence: SendCadence) -> Self {
        Self {
            cadence,
            dirty: false,
            last_sent: None,
        }
    }

    pub fn cadence(&self) -> &SendCadence {
        &self.cadence
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark(&mut self) {
        self.dirty = true;
    }

    /// Clear the dirty flag after a send at `now`
    pub fn sent(&mut self, now: Tick) {
        self.dirty = false;
        self.last_sent = Some(now);
    }

    /// Clear the dirty flag without counting it as a send
    pub fn clear(&mut self) {
        self.dirty = false;
    }

    /// Forget the last send so the next spawn starts a fresh cadence
    pub fn forget(&mut self) {
        self.dirty = false;
        self.last_sent = None;
    }

    pub fn last_sent(&self) -> Option<Tick> {
        self.last_sent
    }

    /// Whether enough time has passed since the last send
    pub fn can_send(&self, now: Tick) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => ticks_elapsed(last, now) >= self.cadence.min_interval,
        }
    }

    /// Whether the variable has gone unsent for longer than the maximum interval
    pub fn is_stale(&self, now: Tick) -> bool {
        let Some(max_interval) = self.cadence.max_interval else {
            return false;
        };
        match self.last_sent {
            None => true,
            Some(last) => ticks_elapsed(last, now) >= max_interval,
        }
    }

    /// Combine the cadence with a variable's own dirtiness verdicts.
    ///
    /// `significant` is the thresholded answer, `pending` whether anything at
    /// all differs from the last transmitted baseline.
    pub fn should_send(&self, now: Tick, significant: bool, pending: bool) -> bool {
        if !self.can_send(now) {
            return false;
        }
        significant || (pending && self.is_stale(now))
    }
}
