/// Relay forwarding and late-joiner synchronization

use std::sync::{Arc, Mutex};

use tandem_shared::{
    BitReader, ChangeOrigin, ClientId, ListOperation, Replicated, SyncList, SyncVar, VarConfig,
    WritePolicy,
};
use tandem_test::{
    assert_clean, assert_converged, deliver_delta, deliver_full, encode_delta, encode_full,
    init_logging, TestNode,
};

const OWNER: ClientId = ClientId(1);
const OBSERVER: ClientId = ClientId(2);

fn owner_only() -> VarConfig {
    VarConfig::default().with_write_policy(WritePolicy::OwnerOnly)
}

#[test]
fn scalar_relay_forwards_owner_write() {
    init_logging();
    let owning_client = TestNode::client(OWNER, Some(OWNER));
    let authority = TestNode::authority(Some(OWNER));
    let observer = TestNode::client(OBSERVER, Some(OWNER));

    let mut origin = SyncVar::new(String::from("idle"), owner_only());
    let mut relay = SyncVar::new(String::from("idle"), owner_only());
    let mut replica = SyncVar::new(String::from("idle"), owner_only());
    assert!(origin.initialize(&owning_client.handle()));
    assert!(relay.initialize(&authority.handle()));
    assert!(replica.initialize(&observer.handle()));

    origin.set(String::from("running"));
    let inbound = encode_delta(&origin);
    origin.reset_dirty();

    let applied = relay
        .read_delta_from(&mut BitReader::new(&inbound), true, Some(OWNER))
        .unwrap();
    assert!(applied);
    assert!(relay.is_dirty());
    assert!(relay.ready_to_send(authority.now()));
    assert!(authority.owner.is_marked_dirty());

    let outbound = encode_delta(&relay);
    relay.post_delta_read();
    assert_clean!(relay);

    deliver_delta(&mut replica, &outbound).unwrap();
    assert_converged!(replica, origin);
}

#[test]
fn terminal_read_does_not_forward() {
    init_logging();
    let authority = TestNode::authority(None);
    let observer = TestNode::client(OBSERVER, None);

    let mut source = SyncList::from_vec(vec![1u8], VarConfig::default());
    let mut replica = SyncList::from_vec(vec![1u8], VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(replica.initialize(&observer.handle()));

    source.add(2);
    let bytes = encode_delta(&source);
    replica
        .read_delta(&mut BitReader::new(&bytes), false)
        .unwrap();

    assert!(replica.pending_events().is_empty());
    assert!(!observer.owner.is_marked_dirty());
    replica.post_delta_read();
    assert_clean!(replica);
    assert_eq!(replica.transmitted(), &[1, 2]);
}

#[test]
fn non_authority_relay_keeps_log_until_its_own_send() {
    init_logging();
    let authority = TestNode::authority(None);
    // a mid-tier node that forwards but is not the authority
    let mid_tier = TestNode::client(ClientId(9), None);
    let leaf = TestNode::client(OBSERVER, None);

    let mut source = SyncList::from_vec(vec![5u16], VarConfig::default());
    let mut relay = SyncList::from_vec(vec![5u16], VarConfig::default());
    let mut replica = SyncList::from_vec(vec![5u16], VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(relay.initialize(&mid_tier.handle()));
    assert!(replica.initialize(&leaf.handle()));

    source.insert(0, 4).unwrap();
    source.add(6);
    let inbound = encode_delta(&source);
    source.reset_dirty();

    relay.read_delta(&mut BitReader::new(&inbound), true).unwrap();
    relay.post_delta_read();

    // the send was deferred: the log and its baseline must survive
    assert!(relay.is_dirty());
    assert_eq!(relay.pending_events().len(), 2);
    assert_eq!(relay.transmitted(), &[5]);

    let outbound = encode_delta(&relay);
    relay.reset_dirty();
    assert_clean!(relay);

    deliver_delta(&mut replica, &outbound).unwrap();
    assert_eq!(replica.as_slice(), &[4, 5, 6]);
}

#[test]
fn relayed_full_snapshot_is_forwarded_as_full_snapshot() {
    init_logging();
    let authority = TestNode::authority(None);
    let mid_tier = TestNode::authority(None);
    let leaf = TestNode::client(OBSERVER, None);

    let mut source = SyncList::from_vec(vec![1u8, 2, 3], VarConfig::default());
    let mut relay = SyncList::from_vec(vec![1u8, 2, 3], VarConfig::default());
    let mut replica = SyncList::from_vec(vec![1u8, 2, 3], VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(relay.initialize(&mid_tier.handle()));
    assert!(replica.initialize(&leaf.handle()));

    source.add(4);
    source.check_dirty_state(true);
    assert!(source.is_resending_all());
    let inbound = encode_delta(&source);

    relay.read_delta(&mut BitReader::new(&inbound), true).unwrap();
    assert!(relay.is_resending_all());
    let outbound = encode_delta(&relay);
    relay.post_delta_read();

    deliver_delta(&mut replica, &outbound).unwrap();
    assert_eq!(replica.as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn late_joiner_gets_baseline_then_pending_delta() {
    init_logging();
    let authority = TestNode::authority(None);
    let early = TestNode::client(ClientId(2), None);
    let late = TestNode::client(ClientId(3), None);

    let mut source = SyncList::from_vec(vec![1u32, 2, 3], VarConfig::default());
    let mut early_replica = SyncList::from_vec(vec![1u32, 2, 3], VarConfig::default());
    let mut late_replica = SyncList::<u32>::new(VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(early_replica.initialize(&early.handle()));
    assert!(late_replica.initialize(&late.handle()));

    source.add(4);

    // the late joiner syncs while the Add is still pending
    deliver_full(&mut late_replica, &encode_full(&source)).unwrap();
    assert_eq!(late_replica.as_slice(), &[1, 2, 3]);

    let delta = encode_delta(&source);
    source.reset_dirty();
    deliver_delta(&mut early_replica, &delta).unwrap();
    deliver_delta(&mut late_replica, &delta).unwrap();

    assert_eq!(early_replica.as_slice(), &[1, 2, 3, 4]);
    assert_eq!(late_replica.as_slice(), &[1, 2, 3, 4]);
}

#[test]
fn late_joiner_scalar_is_not_sent_the_change_twice() {
    init_logging();
    let authority = TestNode::authority(None);
    let late = TestNode::client(ClientId(3), None);

    let mut source = SyncVar::new(1u64, VarConfig::default());
    let mut late_replica = SyncVar::new(0u64, VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(late_replica.initialize(&late.handle()));

    let changes = Arc::new(Mutex::new(Vec::new()));
    let seen = changes.clone();
    late_replica.on_change(move |previous, next, origin| {
        seen.lock().unwrap().push((*previous, *next, origin));
    });

    source.set(2);
    deliver_full(&mut late_replica, &encode_full(&source)).unwrap();
    deliver_delta(&mut late_replica, &encode_delta(&source)).unwrap();

    assert_eq!(*late_replica, 2);
    assert_eq!(
        *changes.lock().unwrap(),
        vec![(0, 1, ChangeOrigin::Remote), (1, 2, ChangeOrigin::Remote)]
    );
}

#[test]
fn list_notifications_fire_per_replayed_event() {
    init_logging();
    let authority = TestNode::authority(None);
    let observer = TestNode::client(OBSERVER, None);

    let mut source = SyncList::from_vec(vec![10u8, 20], VarConfig::default());
    let mut replica = SyncList::from_vec(vec![10u8, 20], VarConfig::default());
    assert!(source.initialize(&authority.handle()));
    assert!(replica.initialize(&observer.handle()));

    let operations = Arc::new(Mutex::new(Vec::new()));
    let seen = operations.clone();
    replica.on_change(move |change| {
        seen.lock()
            .unwrap()
            .push((change.operation, change.index, change.previous, change.value));
    });

    source.remove(&10);
    source.set_at(0, 21).unwrap();
    source.clear();
    source.add(1);
    deliver_delta(&mut replica, &encode_delta(&source)).unwrap();

    // Clear superseded the first two events before they were sent
    assert_eq!(
        *operations.lock().unwrap(),
        vec![
            (ListOperation::Clear, None, None, None),
            (ListOperation::Add, Some(0), None, Some(1)),
        ]
    );
}
