use crate::types::Tick;

/// Whether `a` comes after `b` on the wrapping clock. Ticks more than half
/// the range apart are taken to have wrapped.
pub fn tick_greater_than(a: Tick, b: Tick) -> bool {
    tick_diff(b, a) > 0
}

/// Signed distance from `earlier` to `later`, taking the shorter way around
pub fn tick_diff(earlier: Tick, later: Tick) -> i16 {
    later.wrapping_sub(earlier) as i16
}

/// Number of ticks elapsed going from `earlier` to `later`.
/// A `later` tick that is actually behind `earlier` counts as zero.
pub fn ticks_elapsed(earlier: Tick, later: Tick) -> u16 {
    u16::try_from(tick_diff(earlier, later)).unwrap_or(0)
}
