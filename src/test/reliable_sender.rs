use super::support::{block_port_with_free_successor, lossless_sender, loopback_channel, wait_for};
use crate::channel;
use crate::config::SenderConfig;
use crate::sender::ReliableSender;
use crate::wire::Datagram;
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[test]
fn lossless_acks_resolve_window_in_first_wait_round() {
    let handle = channel::listen(&loopback_channel(0.0, 5), |_d: &Datagram| Ok(()))
        .expect("start channel");
    let mut sender = ReliableSender::connect(handle.local_addr(), lossless_sender(5, 150, 3))
        .expect("connect");

    let start = Instant::now();
    let ws = sender.send_window(1, 12);
    let elapsed = start.elapsed();

    assert_eq!(ws.acked, 5, "all packets acked: {ws:?}");
    assert_eq!(ws.dropped, 0);
    assert_eq!(ws.sent, 5);
    assert_eq!(ws.retransmitted, 0, "no retransmissions when acks beat the timeout");
    assert!(
        elapsed < Duration::from_millis(290),
        "window should finish after one wait round, took {elapsed:?}"
    );
}

#[test]
fn total_ack_loss_gives_up_after_max_retries() {
    let handle = channel::listen(&loopback_channel(1.0, 0), |_d: &Datagram| Ok(()))
        .expect("start channel");
    let mut sender = ReliableSender::connect(handle.local_addr(), lossless_sender(4, 20, 3))
        .expect("connect");

    let ws = sender.send_window(2, 30);
    assert_eq!(ws.acked, 0);
    assert_eq!(ws.dropped, 4);
    assert_eq!(ws.sent, 12, "every packet sent max_retries times");
    assert_eq!(ws.retransmitted, 8);
    assert!(sender.ack_set().is_empty());

    assert!(
        wait_for(Duration::from_secs(2), || handle.stats().received == 12),
        "channel should see every transmission: {}",
        handle.stats()
    );
    let stats = handle.stats();
    assert_eq!(stats.acks_dropped, 12);
    assert_eq!(stats.acks_sent, 0);
}

#[test]
fn windows_use_fresh_increasing_sequence_ranges() {
    let (tx, rx) = mpsc::channel();
    let handle = channel::listen(&loopback_channel(0.0, 1), move |d: &Datagram| {
        if let Some(seq) = d.seq() {
            let _ = tx.send(seq);
        }
        Ok(())
    })
    .expect("start channel");
    let mut sender = ReliableSender::connect(handle.local_addr(), lossless_sender(3, 60, 3))
        .expect("connect");

    let a = sender.send_window(1, 5);
    let b = sender.send_window(1, 6);
    assert_eq!(a.acked + a.dropped, 3);
    assert_eq!(b.acked + b.dropped, 3);
    assert_eq!(sender.next_seq(), 6);

    let mut seen: Vec<u64> = rx.try_iter().collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen, (0..6).collect::<Vec<_>>());

    let totals = sender.stats();
    assert_eq!(totals.windows, 2);
    assert_eq!(totals.acked + totals.dropped, 6);
}

#[test]
fn every_packet_is_acked_or_exhausted_under_random_loss() {
    let mut cfg = loopback_channel(0.5, 0);
    cfg.ack_delay_max_ms = 30;
    let handle = channel::listen(&cfg, |_d: &Datagram| Ok(())).expect("start channel");
    let sender_cfg = SenderConfig {
        send_loss: 0.3,
        ..lossless_sender(6, 40, 3)
    };
    let mut sender = ReliableSender::connect(handle.local_addr(), sender_cfg).expect("connect");

    for round in 0..3 {
        let ws = sender.send_window(3, round);
        assert_eq!(ws.acked + ws.dropped, 6, "round {round}: {ws:?}");
        assert!(ws.sent <= 6 * 3, "retry cap bounds transmissions: {ws:?}");
    }
}

#[test]
fn sender_targeting_busy_port_gets_no_acks() {
    let (blocker, port) = block_port_with_free_successor();
    let mut cfg = loopback_channel(0.0, 1);
    cfg.port = port;
    let handle = channel::listen(&cfg, |_d: &Datagram| Ok(())).expect("start channel");
    assert_eq!(handle.local_addr().port(), port + 1);

    let busy: SocketAddr = ([127, 0, 0, 1], port).into();
    let mut sender = ReliableSender::connect(busy, lossless_sender(3, 20, 2)).expect("connect");
    let ws = sender.send_window(1, 4);
    assert_eq!(ws.acked, 0);
    assert_eq!(ws.dropped, 3);
    assert_eq!(handle.stats().received, 0);
    drop(blocker);
}

#[test]
fn send_errors_count_as_attempts_and_window_still_ends() {
    // IPv4 套接字发往 IPv6 地址，每次 send_to 都会失败
    let socket = UdpSocket::bind("127.0.0.1:0").expect("bind v4");
    let dest: SocketAddr = "[::1]:9".parse().expect("v6 addr");
    let mut sender = ReliableSender::with_socket(socket, dest, lossless_sender(3, 10, 2)).expect("sender");

    let ws = sender.send_window(1, 7);
    assert_eq!(ws.send_errors, 3 * 2, "{ws:?}");
    assert_eq!(ws.sent, 0);
    assert_eq!(ws.acked, 0);
    assert_eq!(ws.dropped, 3);
    assert_eq!(sender.stats().send_errors, 6);
}

#[test]
fn simulated_send_loss_skips_without_consuming_retries() {
    let handle = channel::listen(&loopback_channel(0.0, 1), |_d: &Datagram| Ok(()))
        .expect("start channel");
    let cfg = SenderConfig {
        send_loss: 0.8,
        ..lossless_sender(5, 30, 3)
    };
    let mut sender = ReliableSender::connect(handle.local_addr(), cfg).expect("connect");

    let ws = sender.send_window(2, 9);
    assert!(ws.send_losses > 0, "{ws:?}");
    assert_eq!(ws.acked + ws.dropped, 5, "{ws:?}");
    assert!(ws.sent + ws.send_errors <= 5 * 3, "{ws:?}");
    // 无 ACK 丢失时，只有真正发出去的包才会被确认
    assert_eq!(ws.dropped, 0, "{ws:?}");
}

#[test]
fn ack_listener_ignores_malformed_datagrams() {
    let sender = ReliableSender::connect("127.0.0.1:9", lossless_sender(1, 10, 1)).expect("connect");
    let port = sender.local_addr().expect("local addr").port();
    let to: SocketAddr = ([127, 0, 0, 1], port).into();
    let peer = UdpSocket::bind("127.0.0.1:0").expect("bind peer");

    for junk in [&b"garbage"[..], br#"{"seq": 1}"#, b"null", br#"{"ack": "x"}"#] {
        peer.send_to(junk, to).expect("send junk");
    }
    peer.send_to(br#"{"ack": 42}"#, to).expect("send ack");

    assert!(wait_for(Duration::from_secs(1), || sender.ack_set().contains(42)));
    assert_eq!(sender.ack_set().len(), 1);
}

#[test]
fn invalid_sender_config_is_rejected() {
    let cfg = SenderConfig {
        send_loss: 1.0,
        ..SenderConfig::default()
    };
    assert!(ReliableSender::connect("127.0.0.1:9", cfg).is_err());
}
