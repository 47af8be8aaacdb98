// src/session.rs
//
// The single-peer control session.
//
// Owns the listening socket and at most one accepted connection. The
// protocol is strictly half-duplex: one command frame out, one observation
// frame back, per step. There is never more than one exchange in flight.
//
// Recovery model: a peer disconnect or read deadline drops the connection
// and moves the session back to `AwaitingPeer`; the next call to
// `ensure_peer` blocks on a fresh accept. Nothing here retries
// automatically — retry policy belongs to the caller.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use crate::codec::{self, FrameError, CMD_ARITY, OBS_ARITY};
use crate::config::TransportConfig;
use crate::types::Observation;

/// Byte length of an observation frame.
const OBS_FRAME_BYTES: usize = 4 * OBS_ARITY;

/// Polling interval while waiting for a peer under an accept deadline.
const ACCEPT_POLL: Duration = Duration::from_millis(5);

/// Whether the active connection persists across steps.
///
/// `PerStep` reproduces the original accept-per-step behaviour for peers
/// that open a fresh connection for every exchange; `Persistent` is the
/// default and keeps one socket alive for the whole episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Keep the accepted connection until the peer drops it.
    Persistent,
    /// Drop and re-accept the connection on every step.
    PerStep,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Persistent
    }
}

/// Observable session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Listener bound, no peer ever accepted.
    Listening,
    /// No active peer; an accept is required before the next exchange.
    AwaitingPeer,
    /// A command frame has been sent; waiting on the observation frame.
    Exchanging,
    /// A peer is connected and no exchange is in flight.
    Idle,
}

/// Errors produced by the control session.
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The listening socket could not be established. Fatal at startup.
    Bind { addr: String, source: String },
    /// The peer disconnected. A fresh accept is required before the next
    /// exchange.
    PeerClosed,
    /// No data (or no peer) within the configured deadline. Recoverable:
    /// the connection is dropped and re-accepted on the next step.
    Timeout,
    /// The received bytes do not form a well-sized frame. The current step
    /// is aborted with no state mutation.
    Frame(FrameError),
    /// Any other transport-level failure.
    Io { source: String },
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Bind { addr, source } => {
                write!(f, "failed to bind control listener on {}: {}", addr, source)
            }
            SessionError::PeerClosed => write!(f, "simulator peer closed the connection"),
            SessionError::Timeout => write!(f, "simulator peer deadline elapsed"),
            SessionError::Frame(e) => write!(f, "{}", e),
            SessionError::Io { source } => write!(f, "transport error: {}", source),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<FrameError> for SessionError {
    fn from(e: FrameError) -> Self {
        SessionError::Frame(e)
    }
}

/// The control channel to the single simulator peer.
#[derive(Debug)]
pub struct ControlSession {
    listener: TcpListener,
    peer: Option<TcpStream>,
    state: SessionState,
    accept_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    reconnect: ReconnectPolicy,
}

impl ControlSession {
    /// Bind the listening socket. Process-wide there is one session; a
    /// failure here is fatal at startup.
    pub fn bind(cfg: &TransportConfig) -> Result<Self, SessionError> {
        let listener = TcpListener::bind(&cfg.listen_addr).map_err(|e| SessionError::Bind {
            addr: cfg.listen_addr.clone(),
            source: e.to_string(),
        })?;
        Ok(Self {
            listener,
            peer: None,
            state: SessionState::Listening,
            accept_timeout: cfg.accept_timeout_ms.map(Duration::from_millis),
            read_timeout: cfg.read_timeout_ms.map(Duration::from_millis),
            reconnect: cfg.reconnect,
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a peer connection is currently active.
    pub fn has_peer(&self) -> bool {
        self.peer.is_some()
    }

    /// Make sure a peer connection is active, accepting one if needed.
    ///
    /// Under `ReconnectPolicy::PerStep` any existing connection is dropped
    /// first, so every step admits a fresh peer.
    pub fn ensure_peer(&mut self) -> Result<(), SessionError> {
        if self.reconnect == ReconnectPolicy::PerStep {
            self.drop_peer();
        }
        if self.peer.is_some() {
            return Ok(());
        }
        self.state = SessionState::AwaitingPeer;
        let stream = self.accept_peer()?;
        stream
            .set_read_timeout(self.read_timeout)
            .map_err(|e| SessionError::Io { source: e.to_string() })?;
        self.peer = Some(stream);
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Encode and send one command frame to the connected peer.
    ///
    /// Fails with `PeerClosed` when no connection is active.
    pub fn send_command(&mut self, cmd: &[f32; CMD_ARITY]) -> Result<(), SessionError> {
        let frame = codec::encode_frame(cmd);
        let stream = match self.peer.as_mut() {
            Some(s) => s,
            None => return Err(SessionError::PeerClosed),
        };
        let result = stream.write_all(&frame);
        match result {
            Ok(()) => {
                self.state = SessionState::Exchanging;
                Ok(())
            }
            Err(e) => {
                self.drop_peer();
                Err(classify_io(e))
            }
        }
    }

    /// Block until one full observation frame is received, then decode it.
    ///
    /// - Zero bytes before any frame data: `PeerClosed`.
    /// - Peer closes mid-frame: `Frame(Length)` with the short byte count.
    /// - Read deadline elapsed: `Timeout`.
    ///
    /// Any failure drops the connection; the session must re-accept before
    /// the next exchange.
    pub fn recv_observation(&mut self) -> Result<Observation, SessionError> {
        let stream = match self.peer.as_mut() {
            Some(s) => s,
            None => return Err(SessionError::PeerClosed),
        };
        let mut buf = [0u8; OBS_FRAME_BYTES];
        let outcome = read_until_full(stream, &mut buf);
        match outcome {
            Ok(n) if n == OBS_FRAME_BYTES => {
                self.state = SessionState::Idle;
                let values = codec::decode_frame(&buf, OBS_ARITY)?;
                Ok(Observation {
                    tag: values[0],
                    yaw: values[1],
                    pitch: values[2],
                    zoom: values[3],
                    mi: values[4],
                })
            }
            Ok(0) => {
                self.drop_peer();
                Err(SessionError::PeerClosed)
            }
            Ok(n) => {
                self.drop_peer();
                Err(SessionError::Frame(FrameError::Length {
                    expected: OBS_FRAME_BYTES,
                    got: n,
                }))
            }
            Err(e) => {
                self.drop_peer();
                Err(classify_io(e))
            }
        }
    }

    /// One half-duplex exchange: send a command frame, block for the
    /// observation frame.
    pub fn exchange(&mut self, cmd: &[f32; CMD_ARITY]) -> Result<Observation, SessionError> {
        self.send_command(cmd)?;
        self.recv_observation()
    }

    /// Drop the active connection and require a fresh accept.
    pub fn drop_peer(&mut self) {
        self.peer = None;
        self.state = SessionState::AwaitingPeer;
    }

    /// Accept one connection, honouring the configured accept deadline.
    fn accept_peer(&mut self) -> Result<TcpStream, SessionError> {
        let io_err = |e: io::Error| SessionError::Io { source: e.to_string() };
        match self.accept_timeout {
            None => {
                self.listener.set_nonblocking(false).map_err(io_err)?;
                let (stream, _) = self.listener.accept().map_err(io_err)?;
                Ok(stream)
            }
            Some(deadline) => {
                // std's TcpListener has no accept timeout; poll a
                // non-blocking accept until the deadline.
                self.listener.set_nonblocking(true).map_err(io_err)?;
                let started = Instant::now();
                loop {
                    match self.listener.accept() {
                        Ok((stream, _)) => {
                            // The accepted socket must not inherit the
                            // listener's non-blocking mode.
                            stream.set_nonblocking(false).map_err(io_err)?;
                            return Ok(stream);
                        }
                        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                            if started.elapsed() >= deadline {
                                return Err(SessionError::Timeout);
                            }
                            std::thread::sleep(ACCEPT_POLL);
                        }
                        Err(e) => return Err(io_err(e)),
                    }
                }
            }
        }
    }
}

/// Read until `buf` is full or the stream reaches EOF.
///
/// Returns the number of bytes read; anything short of `buf.len()` means
/// the peer closed mid-frame (0 means an orderly close before any data).
fn read_until_full(stream: &mut TcpStream, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Map a transport error onto the protocol's failure kinds.
fn classify_io(e: io::Error) -> SessionError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SessionError::Timeout,
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => SessionError::PeerClosed,
        _ => SessionError::Io {
            source: e.to_string(),
        },
    }
}
