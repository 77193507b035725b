/// The reference scenarios for scalar writes, list event logs, dirtiness
/// thresholds and relay forwarding

use tandem_shared::{
    exceeds_epsilon, BitReader, ClientId, ListEvent, Replicated, SyncList, SyncVar, VarConfig,
    WritePolicy,
};
use tandem_test::{deliver_delta, encode_delta, init_logging, TestNode};

const OWNER: ClientId = ClientId(1);
const OBSERVER_A: ClientId = ClientId(2);
const OBSERVER_B: ClientId = ClientId(3);

#[test]
fn scenario_a_authority_write_and_rejected_remote_write() {
    init_logging();
    let authority = TestNode::authority(None);
    let client = TestNode::client(OBSERVER_A, None);

    let mut source = SyncVar::new(0i32, VarConfig::default());
    let mut replica = SyncVar::new(0i32, VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(replica.initialize(&client.handle()));

    source.set(5);
    assert!(source.is_dirty());
    let bytes = encode_delta(&source);
    source.reset_dirty();
    assert!(!source.is_dirty());

    deliver_delta(&mut replica, &bytes).unwrap();
    assert_eq!(*replica, 5);

    // the client is not the authority
    replica.set(99);
    assert_eq!(*replica, 5);
    assert!(!replica.is_dirty());
    assert_eq!(*source, 5);
}

#[test]
fn scenario_b_list_log_replays_on_replica() {
    init_logging();
    let authority = TestNode::authority(None);
    let client = TestNode::client(OBSERVER_A, None);

    let mut source = SyncList::from_vec(vec![1u32, 2, 3], VarConfig::default());
    let mut replica = SyncList::from_vec(vec![1u32, 2, 3], VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(replica.initialize(&client.handle()));

    source.insert(1, 9).unwrap();
    assert_eq!(source.as_slice(), &[1, 9, 2, 3]);
    assert_eq!(source.pending_events(), &[ListEvent::Insert(1, 9)]);

    source.remove_at(3).unwrap();
    assert_eq!(source.as_slice(), &[1, 9, 2]);
    assert_eq!(
        source.pending_events(),
        &[ListEvent::Insert(1, 9), ListEvent::RemoveAt(3)]
    );

    let bytes = encode_delta(&source);
    source.reset_dirty();
    assert!(source.pending_events().is_empty());

    deliver_delta(&mut replica, &bytes).unwrap();
    assert_eq!(replica.as_slice(), &[1, 9, 2]);
}

#[test]
fn scenario_c_threshold_suppresses_micro_updates() {
    init_logging();
    let authority = TestNode::authority(None);
    let mut var = SyncVar::new(10.0f32, VarConfig::default()).with_threshold(exceeds_epsilon(0.01));
    assert!(var.initialize(&authority.handle()));

    var.set(10.001);
    assert!(!var.is_dirty());
    assert!(var.has_pending_change());

    var.set(10.02);
    assert!(var.is_dirty());
}

#[test]
fn scenario_d_relay_forwards_identical_bytes() {
    init_logging();
    let owning_client = TestNode::client(OWNER, Some(OWNER));
    let authority = TestNode::authority(Some(OWNER));
    let observer_a = TestNode::client(OBSERVER_A, Some(OWNER));
    let observer_b = TestNode::client(OBSERVER_B, Some(OWNER));

    let config = VarConfig::default().with_write_policy(WritePolicy::OwnerOnly);
    let mut origin = SyncList::from_vec(vec![1u8, 2], config.clone());
    let mut relay = SyncList::from_vec(vec![1u8, 2], config.clone());
    let mut replica_a = SyncList::from_vec(vec![1u8, 2], config.clone());
    let mut replica_b = SyncList::from_vec(vec![1u8, 2], config);
    assert!(origin.initialize(&owning_client.handle()));
    assert!(relay.initialize(&authority.handle()));
    assert!(replica_a.initialize(&observer_a.handle()));
    assert!(replica_b.initialize(&observer_b.handle()));

    origin.add(3);
    origin.set_at(0, 7).unwrap();
    let inbound = encode_delta(&origin);
    origin.reset_dirty();

    let applied = relay
        .read_delta_from(&mut BitReader::new(&inbound), true, Some(OWNER))
        .unwrap();
    assert!(applied);
    assert_eq!(relay.as_slice(), &[7, 2, 3]);
    assert!(relay.is_dirty());

    let to_a = encode_delta(&relay);
    let to_b = encode_delta(&relay);
    assert_eq!(to_a, to_b);
    assert_eq!(to_a, inbound, "the relay re-emits the delta it received");

    relay.post_delta_read();
    assert!(!relay.is_dirty());
    assert!(relay.pending_events().is_empty());

    deliver_delta(&mut replica_a, &to_a).unwrap();
    deliver_delta(&mut replica_b, &to_b).unwrap();
    assert_eq!(replica_a.as_slice(), origin.as_slice());
    assert_eq!(replica_b.as_slice(), origin.as_slice());
}
