// tests/session_tests.rs
//
// Session-level tests: bind failures, the lifecycle state machine, accept
// deadlines, and the reconnect policies.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;

use viewlink::{
    decode_frame, encode_frame, ControlSession, ReconnectPolicy, SessionError, SessionState,
    TransportConfig,
};

fn make_transport() -> TransportConfig {
    TransportConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        accept_timeout_ms: Some(5_000),
        read_timeout_ms: Some(5_000),
        reconnect: ReconnectPolicy::Persistent,
    }
}

/// Peer that answers `count` exchanges by echoing the command back into an
/// observation frame `[0, yaw, pitch, zoom, 0.5]`.
fn spawn_echo_peer(addr: SocketAddr, count: usize) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = TcpStream::connect(addr).expect("connect");
        for _ in 0..count {
            let mut buf = [0u8; 12];
            stream.read_exact(&mut buf).expect("command");
            let cmd = decode_frame(&buf, 3).expect("decode");
            let obs = [0.0, cmd[0], cmd[1], cmd[2], 0.5];
            stream.write_all(&encode_frame(&obs)).expect("observation");
        }
    })
}

#[test]
fn test_bind_error_on_occupied_address() {
    let first = ControlSession::bind(&make_transport()).expect("first bind");
    let addr = first.local_addr().expect("bound address");

    let mut cfg = make_transport();
    cfg.listen_addr = addr.to_string();
    let err = ControlSession::bind(&cfg).expect_err("second bind on same port");
    match err {
        SessionError::Bind { addr: failed, .. } => assert_eq!(failed, addr.to_string()),
        other => panic!("expected Bind, got {:?}", other),
    }
}

#[test]
fn test_lifecycle_states() {
    let mut session = ControlSession::bind(&make_transport()).expect("bind");
    assert_eq!(session.state(), SessionState::Listening);
    assert!(!session.has_peer());

    let addr = session.local_addr().expect("addr");
    let peer = spawn_echo_peer(addr, 1);

    session.ensure_peer().expect("accept");
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.has_peer());

    let obs = session.exchange(&[42.0, 7.0, -6.5]).expect("exchange");
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(obs.yaw, 42.0);
    assert_eq!(obs.pitch, 7.0);
    assert_eq!(obs.zoom, -6.5);
    assert_eq!(obs.mi, 0.5);

    session.drop_peer();
    assert_eq!(session.state(), SessionState::AwaitingPeer);
    assert!(!session.has_peer());
    peer.join().expect("peer thread");
}

#[test]
fn test_accept_deadline_elapses_without_peer() {
    let mut cfg = make_transport();
    cfg.accept_timeout_ms = Some(100);
    let mut session = ControlSession::bind(&cfg).expect("bind");

    let err = session.ensure_peer().expect_err("no peer ever connects");
    assert!(
        matches!(err, SessionError::Timeout),
        "expected Timeout, got {:?}",
        err
    );
    assert_eq!(session.state(), SessionState::AwaitingPeer);
}

#[test]
fn test_exchange_without_peer_is_peer_closed() {
    let mut session = ControlSession::bind(&make_transport()).expect("bind");
    assert!(matches!(
        session.send_command(&[0.0, 0.0, 0.0]),
        Err(SessionError::PeerClosed)
    ));
    assert!(matches!(
        session.recv_observation(),
        Err(SessionError::PeerClosed)
    ));
}

#[test]
fn test_per_step_policy_admits_a_fresh_peer_each_step() {
    let mut cfg = make_transport();
    cfg.reconnect = ReconnectPolicy::PerStep;
    let mut session = ControlSession::bind(&cfg).expect("bind");
    let addr = session.local_addr().expect("addr");

    let peer1 = spawn_echo_peer(addr, 1);
    session.ensure_peer().expect("first accept");
    session.exchange(&[1.0, 0.0, -7.0]).expect("first exchange");
    peer1.join().expect("first peer");

    // The second step must not reuse the first connection.
    let peer2 = spawn_echo_peer(addr, 1);
    session.ensure_peer().expect("second accept");
    let obs = session.exchange(&[2.0, 0.0, -7.0]).expect("second exchange");
    assert_eq!(obs.yaw, 2.0);
    peer2.join().expect("second peer");
}

#[test]
fn test_persistent_policy_reuses_the_connection() {
    let mut session = ControlSession::bind(&make_transport()).expect("bind");
    let addr = session.local_addr().expect("addr");
    let peer = spawn_echo_peer(addr, 3);

    for i in 0..3 {
        session.ensure_peer().expect("peer active");
        let obs = session
            .exchange(&[i as f32, 0.0, -7.0])
            .expect("exchange over the same socket");
        assert_eq!(obs.yaw, i as f32);
    }
    peer.join().expect("peer thread");
}
