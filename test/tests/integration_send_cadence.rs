/// Send cadence: minimum interval throttling, staleness, tick wraparound

use tandem_shared::{exceeds_epsilon, Replicated, SendCadence, SyncVar, VarConfig};
use tandem_test::{init_logging, TestNode};

fn cadenced(min_interval: u16, max_interval: Option<u16>) -> VarConfig {
    VarConfig::default().with_cadence(SendCadence::new(min_interval, max_interval))
}

#[test]
fn min_interval_throttles_dirty_variable() {
    init_logging();
    let authority = TestNode::authority(None);
    let mut var = SyncVar::new(0i32, cadenced(5, None));
    assert!(var.initialize(&authority.handle()));

    var.set(1);
    assert!(var.ready_to_send(0));
    var.reset_dirty();

    authority.tick(2);
    var.set(2);
    assert!(var.is_dirty());
    assert!(!var.ready_to_send(2));

    authority.tick(5);
    assert!(var.ready_to_send(5));
}

#[test]
fn stale_pending_change_goes_out_below_threshold() {
    init_logging();
    let authority = TestNode::authority(None);
    let mut var = SyncVar::new(1.0f32, cadenced(0, Some(20))).with_threshold(exceeds_epsilon(0.5));
    assert!(var.initialize(&authority.handle()));

    var.set(5.0);
    var.reset_dirty();

    authority.tick(3);
    var.set(5.1);
    assert!(!var.is_dirty());
    assert!(!var.ready_to_send(3));
    assert!(!var.ready_to_send(19));
    assert!(var.ready_to_send(20));
}

#[test]
fn stale_without_pending_change_stays_quiet() {
    init_logging();
    let authority = TestNode::authority(None);
    let mut var = SyncVar::new(1u8, cadenced(0, Some(4)));
    assert!(var.initialize(&authority.handle()));

    var.set(2);
    var.reset_dirty();
    assert!(!var.ready_to_send(100));
}

#[test]
fn cadence_survives_tick_wraparound() {
    init_logging();
    let authority = TestNode::authority(None);
    authority.tick(u16::MAX - 2);
    let mut var = SyncVar::new(0u16, cadenced(5, None));
    assert!(var.initialize(&authority.handle()));

    var.set(1);
    var.reset_dirty();
    var.set(2);

    assert!(!var.ready_to_send(1));
    assert!(var.ready_to_send(2));
}

#[test]
fn clock_behind_last_send_counts_as_no_time() {
    init_logging();
    let authority = TestNode::authority(None);
    authority.tick(100);
    let mut var = SyncVar::new(0u16, cadenced(5, None));
    assert!(var.initialize(&authority.handle()));

    var.set(1);
    var.reset_dirty();
    var.set(2);

    assert!(!var.ready_to_send(99));
}

#[test]
fn uninitialized_variable_is_never_ready() {
    init_logging();
    let mut var = SyncVar::new(0u16, VarConfig::default());
    var.set(4);
    assert!(!var.ready_to_send(0));
}
