/// The three versions of a replicated value a container diffs against.
///
/// `current` is the live value, `observed` is the value as of the last
/// dirtiness check, and `transmitted` is the baseline the last send was
/// computed from. Right after `commit` all three are equal.
#[derive(Clone, Debug)]
pub struct SnapshotStore<T: Clone + PartialEq> {
    current: T,
    observed: T,
    transmitted: T,
    primed: bool,
}

impl<T: Clone + PartialEq> SnapshotStore<T> {
    pub fn new(value: T) -> Self {
        Self {
            observed: value.clone(),
            transmitted: value.clone(),
            current: value,
            primed: false,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    pub fn observed(&self) -> &T {
        &self.observed
    }

    pub fn transmitted(&self) -> &T {
        &self.transmitted
    }

    /// Live value and observed snapshot, for mutations that must be applied
    /// to both so they are not mistaken for an in-place edit
    pub fn current_and_observed_mut(&mut self) -> (&mut T, &mut T) {
        (&mut self.current, &mut self.observed)
    }

    /// Whether `prime` has run, i.e. `transmitted` is a real baseline
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Take all three snapshots from the current value and mark the baseline valid
    pub fn prime(&mut self) {
        self.commit();
        self.primed = true;
    }

    pub fn unprime(&mut self) {
        self.primed = false;
    }

    /// Replace the live value, returning the previous one
    pub fn replace(&mut self, value: T) -> T {
        std::mem::replace(&mut self.current, value)
    }

    /// Copy `current` into `observed` and `transmitted`
    pub fn commit(&mut self) {
        if self.observed != self.current {
            self.observed = self.current.clone();
        }
        if self.transmitted != self.current {
            self.transmitted = self.current.clone();
        }
    }

    /// Copy `current` into `observed` only
    pub fn observe(&mut self) {
        if self.observed != self.current {
            self.observed = self.current.clone();
        }
    }

    /// Restore `current` from `observed`, discarding unobserved edits
    pub fn revert(&mut self) {
        self.current = self.observed.clone();
    }

    /// Overwrite all three snapshots with a value received in full
    pub fn overwrite(&mut self, value: T) -> T {
        self.observed = value.clone();
        self.transmitted = value.clone();
        std::mem::replace(&mut self.current, value)
    }

    pub fn differs_from_transmitted(&self) -> bool {
        self.current != self.transmitted
    }

    pub fn differs_from_observed(&self) -> bool {
        self.current != self.observed
    }
}
