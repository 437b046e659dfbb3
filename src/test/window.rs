use crate::sender::{AckSet, Resolution, Window};

#[test]
fn base_advances_only_across_contiguous_resolved_prefix() {
    let acks = AckSet::new();
    let mut w = Window::new(10, 5);
    for seq in 10..15 {
        w.record_attempt(seq);
    }

    acks.insert(11);
    acks.insert(12);
    w.absorb_acks(&acks);
    assert_eq!(w.advance_base(), 10, "hole at 10 must block base");

    acks.insert(10);
    w.absorb_acks(&acks);
    assert_eq!(w.advance_base(), 13);
    assert_eq!(w.unresolved().collect::<Vec<_>>(), vec![13, 14]);
}

#[test]
fn exhausted_sequences_are_given_up_and_unblock_base() {
    let acks = AckSet::new();
    let mut w = Window::new(0, 3);
    for _ in 0..2 {
        for seq in 0..3 {
            w.record_attempt(seq);
        }
    }
    acks.insert(2);
    w.absorb_acks(&acks);

    assert!(w.give_up_exhausted(3).is_empty());
    for seq in 0..2 {
        w.record_attempt(seq);
    }
    assert_eq!(w.give_up_exhausted(3), vec![0, 1]);
    assert_eq!(w.advance_base(), 3);
    assert!(w.is_done());
    assert_eq!(w.count(Resolution::GaveUp), 2);
    assert_eq!(w.count(Resolution::Acked), 1);
    assert_eq!(w.attempts(0), 3);
    // 放弃的序号只体现在窗口结局里，不进入 ACK 集合
    assert_eq!(w.resolution(0), Some(Resolution::GaveUp));
    assert!(!acks.contains(0));
    assert_eq!(acks.len(), 1);
}

#[test]
fn acks_outside_window_are_ignored() {
    let acks = AckSet::new();
    acks.insert(3);
    acks.insert(8);
    let mut w = Window::new(4, 4);
    assert_eq!(w.absorb_acks(&acks), 0);
    assert_eq!(w.base(), 4);

    acks.insert(4);
    assert_eq!(w.absorb_acks(&acks), 1);
    assert_eq!(w.absorb_acks(&acks), 0, "already resolved");
    assert_eq!(w.resolution(4), Some(Resolution::Acked));
}
