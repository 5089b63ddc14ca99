use std::{collections::VecDeque, time::Duration};

use futures::{SinkExt, StreamExt};
use log::warn;
use thiserror::Error;
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::sleep,
};
use tokio_util::codec::Framed;

use cimd_types::{
    command::{Command, CommandError, MessageParams},
    core::{PacketCounter, PacketNumber},
    frame::{Frame, ProtocolError},
    opcode::OpCode,
    param::ParamCode,
    state::State,
};

use super::codec::{ClientCodec, ClientCodecError, Event};
use crate::codec::{decode::DecodeError, escape, serialize};

const DEFAULT_RECONNECT_TIMEOUT_SECS: u64 = 10;

/// Connection settings of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// At most 32 characters.
    pub username: String,
    /// At most 32 characters.
    pub password: String,
    /// Append a checksum to every transmitted frame.
    #[cfg_attr(feature = "serde", serde(default))]
    pub use_checksum: bool,
    /// Delay between a transport fault and the next connection attempt.
    #[cfg_attr(feature = "serde", serde(default = "defaults::reconnect_timeout_secs"))]
    pub reconnect_timeout_secs: u64,
    /// Reconnect and re-login after transport faults.
    #[cfg_attr(feature = "serde", serde(default = "defaults::auto_reconnect"))]
    pub auto_reconnect: bool,
    /// Submit window to ask for at login, 1..=128.
    #[cfg_attr(feature = "serde", serde(default))]
    pub window_size: Option<u8>,
    /// Application instance index, at most three digits.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sub_addr: Option<u16>,
}

#[cfg(feature = "serde")]
mod defaults {
    pub(super) fn reconnect_timeout_secs() -> u64 {
        super::DEFAULT_RECONNECT_TIMEOUT_SECS
    }

    pub(super) fn auto_reconnect() -> bool {
        true
    }
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
            use_checksum: false,
            reconnect_timeout_secs: DEFAULT_RECONNECT_TIMEOUT_SECS,
            auto_reconnect: true,
            window_size: None,
            sub_addr: None,
        }
    }

    pub fn reconnect_timeout(&self) -> Duration {
        Duration::from_secs(self.reconnect_timeout_secs)
    }

    fn validate(&self) -> Result<(), SessionError> {
        if self.port == 0 {
            return Err(SessionError::Config("port must be non-zero"));
        }
        // The login constructor owns the credential and window bounds.
        Command::login(
            &self.username,
            &self.password,
            self.sub_addr,
            self.window_size,
        )?;
        Ok(())
    }
}

/// One observable moment in the life of a session.
#[derive(Debug, Clone, Copy)]
pub enum SessionEvent<'a> {
    Connected { host: &'a str, port: u16 },
    Banner(&'a str),
    Sent(&'a [u8]),
    Received(&'a [u8]),
    Closed { reason: &'a str },
    ReconnectScheduled { delay: Duration },
    StateChanged(State),
}

/// Injectable observer for session events.
///
/// Called from the session driver; implementations should return quickly.
pub trait EventSink: Send {
    fn event(&self, event: SessionEvent<'_>);
}

/// Default sink: forwards everything to the `log` crate, frames rendered
/// in brace-escape form.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn event(&self, event: SessionEvent<'_>) {
        match event {
            SessionEvent::Connected { host, port } => log::info!("connected to {host}:{port}"),
            SessionEvent::Banner(banner) => log::info!("banner: {banner}"),
            SessionEvent::Sent(bytes) => log::debug!("sent: {}", escape::decode(bytes)),
            SessionEvent::Received(bytes) => log::debug!("received: {}", escape::decode(bytes)),
            SessionEvent::Closed { reason } => log::info!("closed: {reason}"),
            SessionEvent::ReconnectScheduled { delay } => {
                log::info!("reconnect scheduled in {delay:?}")
            }
            SessionEvent::StateChanged(state) => log::debug!("state: {state:?}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport dropped while the request was outstanding.
    #[error("transport lost")]
    TransportLost,
    #[error("invalid configuration: {0}")]
    Config(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Codec(#[from] ClientCodecError),
    /// The peer answered with opcode 98/99 or a non-zero error code.
    #[error(transparent)]
    Protocol(ProtocolError),
    /// The login response reported an error. Fatal for this connection;
    /// retried at the next reconnect.
    #[error("login rejected: {0}")]
    LoginRejected(ProtocolError),
    #[error(transparent)]
    Command(#[from] CommandError),
    /// The session shut down before the response arrived.
    #[error("session closed")]
    Closed,
}

type Reply = oneshot::Sender<Result<Frame, SessionError>>;

enum Op {
    Request { command: Command, reply: Reply },
    Close,
}

struct Pending {
    packet_number: PacketNumber,
    expected: Option<OpCode>,
    reply: Reply,
}

/// Handle to a running session.
///
/// Requests may be issued concurrently: they are transmitted in submission
/// order and correlated to responses by echoed packet number. Dropping the
/// handle closes the session.
#[derive(Debug)]
pub struct Session {
    ops: mpsc::Sender<Op>,
    state: watch::Receiver<State>,
    driver: JoinHandle<()>,
}

impl Session {
    /// Connect, consume the banner and log in, then serve requests in a
    /// background task.
    ///
    /// The initial connection and login are performed inline so failures
    /// surface here; once established, transport faults are handled by the
    /// reconnect loop (while `auto_reconnect` is set).
    pub async fn connect(config: ClientConfig) -> Result<Self, SessionError> {
        Self::connect_with_sink(config, Box::new(LogSink)).await
    }

    /// [`Session::connect`] with an injected event sink.
    pub async fn connect_with_sink(
        config: ClientConfig,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let (state_tx, state_rx) = watch::channel(State::Disconnected);
        let mut driver = Driver {
            config,
            sink,
            counter: PacketCounter::new(),
            pending: VecDeque::new(),
            state: state_tx,
        };
        let transport = driver.establish().await?;

        let (ops_tx, ops_rx) = mpsc::channel(64);
        let driver = tokio::spawn(driver.run(transport, ops_rx));

        Ok(Self {
            ops: ops_tx,
            state: state_rx,
            driver,
        })
    }

    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Watch channel mirroring every state transition.
    pub fn state_changes(&self) -> watch::Receiver<State> {
        self.state.clone()
    }

    /// Submit a short message (opcode 03).
    pub async fn submit(&self, message: MessageParams) -> Result<Frame, SessionError> {
        self.request(Command::submit(message.into_params()?)?)
            .await
    }

    /// Ask for the status of a submitted message (opcode 04).
    pub async fn enquire_status(
        &self,
        dest_addr: &str,
        serv_centre_timestamp: &str,
    ) -> Result<Frame, SessionError> {
        self.request(Command::enquire_status(dest_addr, serv_centre_timestamp))
            .await
    }

    /// Ask the centre to start delivering queued messages (opcode 05).
    pub async fn delivery_request(&self, mode: u8) -> Result<Frame, SessionError> {
        self.request(Command::delivery_request(mode)?).await
    }

    /// Cancel earlier messages (opcode 06).
    pub async fn cancel(
        &self,
        mode: u8,
        dest_addr: Option<&str>,
        serv_centre_timestamp: Option<&str>,
    ) -> Result<Frame, SessionError> {
        self.request(Command::cancel(mode, dest_addr, serv_centre_timestamp)?)
            .await
    }

    /// Set a session parameter on the centre (opcode 08).
    pub async fn set_param(
        &self,
        symbol: ParamCode,
        value: &str,
    ) -> Result<Frame, SessionError> {
        self.request(Command::set_param(symbol, value)).await
    }

    /// Query a session parameter from the centre (opcode 09).
    pub async fn get_param(&self, symbol: ParamCode) -> Result<Frame, SessionError> {
        self.request(Command::get_param(symbol)).await
    }

    /// Keep-alive (opcode 40).
    pub async fn alive(&self) -> Result<Frame, SessionError> {
        self.request(Command::alive()).await
    }

    /// Log out (opcode 02). The session stays open; the centre usually
    /// drops the connection afterwards.
    pub async fn logout(&self) -> Result<Frame, SessionError> {
        self.request(Command::logout()).await
    }

    /// Close the session: cancel outstanding requests, drop the socket and
    /// stop the driver. No reconnect is scheduled.
    pub async fn close(self) {
        let _ = self.ops.send(Op::Close).await;
        let _ = self.driver.await;
    }

    async fn request(&self, command: Command) -> Result<Frame, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.ops
            .send(Op::Request {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| SessionError::Closed)?;
        let frame = reply_rx.await.map_err(|_| SessionError::Closed)??;

        match frame.protocol_error() {
            Some(error) => Err(SessionError::Protocol(error)),
            None => Ok(frame),
        }
    }
}

type Transport = Framed<TcpStream, ClientCodec>;

enum Reconnect {
    Establish,
    Shutdown,
}

/// The driver owns the socket, the packet counter and the pending queue;
/// everything runs on its task, so no state is shared or locked.
struct Driver {
    config: ClientConfig,
    sink: Box<dyn EventSink>,
    counter: PacketCounter,
    pending: VecDeque<Pending>,
    state: watch::Sender<State>,
}

impl Driver {
    async fn run(mut self, transport: Transport, mut ops: mpsc::Receiver<Op>) {
        let mut connection = Some(transport);

        loop {
            match connection.take() {
                Some(transport) => {
                    if self.drive(transport, &mut ops).await {
                        return;
                    }
                    if !self.config.auto_reconnect {
                        return;
                    }
                }
                None => match self.await_reconnect(&mut ops).await {
                    Reconnect::Establish => match self.establish().await {
                        Ok(transport) => connection = Some(transport),
                        Err(error) => warn!("reconnect failed: {error}"),
                    },
                    Reconnect::Shutdown => {
                        self.set_state(State::Disconnected);
                        return;
                    }
                },
            }
        }
    }

    /// Serve one established connection. Returns `true` on a local close,
    /// `false` on a transport fault.
    async fn drive(&mut self, mut transport: Transport, ops: &mut mpsc::Receiver<Op>) -> bool {
        let reason = loop {
            tokio::select! {
                op = ops.recv() => match op {
                    Some(Op::Request { command, reply }) => {
                        let packet_number = self.counter.advance();
                        self.pending.push_back(Pending {
                            packet_number,
                            expected: command.opcode().response(),
                            reply,
                        });
                        if let Err(error) =
                            self.transmit(&mut transport, &command, packet_number).await
                        {
                            break error.to_string();
                        }
                    }
                    Some(Op::Close) | None => {
                        self.shut_down("closed locally");
                        return true;
                    }
                },
                event = transport.next() => match event {
                    Some(Ok(Event::Frame { frame, raw })) => {
                        self.sink.event(SessionEvent::Received(&raw));
                        self.dispatch(frame);
                    }
                    Some(Ok(Event::Banner(banner))) => {
                        warn!("ignoring banner mid-session: {banner}");
                    }
                    Some(Err(error)) => break error.to_string(),
                    None => break "connection closed by peer".to_owned(),
                },
            }
        };

        self.shut_down(&reason);
        false
    }

    /// Cancel the pending queue and return to Disconnected. Every entry is
    /// completed exactly once, so no caller waits past this point.
    fn shut_down(&mut self, reason: &str) {
        self.set_state(State::Closing);
        for entry in self.pending.drain(..) {
            let _ = entry.reply.send(Err(SessionError::TransportLost));
        }
        self.sink.event(SessionEvent::Closed { reason });
        self.set_state(State::Disconnected);
    }

    /// Wait out the reconnect delay, failing requests fast in the
    /// meantime.
    async fn await_reconnect(&mut self, ops: &mut mpsc::Receiver<Op>) -> Reconnect {
        let delay = self.config.reconnect_timeout();
        self.sink.event(SessionEvent::ReconnectScheduled { delay });

        let timer = sleep(delay);
        tokio::pin!(timer);
        loop {
            tokio::select! {
                _ = &mut timer => return Reconnect::Establish,
                op = ops.recv() => match op {
                    Some(Op::Request { reply, .. }) => {
                        let _ = reply.send(Err(SessionError::TransportLost));
                    }
                    Some(Op::Close) | None => return Reconnect::Shutdown,
                },
            }
        }
    }

    /// Dial, consume the banner, log in. The packet sequence restarts with
    /// every authenticated connection, never on a failed attempt.
    async fn establish(&mut self) -> Result<Transport, SessionError> {
        self.set_state(State::Connecting);
        match self.handshake().await {
            Ok(transport) => {
                self.counter.reset();
                self.set_state(State::Authenticated);
                Ok(transport)
            }
            Err(error) => {
                let reason = error.to_string();
                self.sink.event(SessionEvent::Closed { reason: &reason });
                self.set_state(State::Disconnected);
                Err(error)
            }
        }
    }

    async fn handshake(&mut self) -> Result<Transport, SessionError> {
        let stream =
            TcpStream::connect((self.config.host.as_str(), self.config.port)).await?;
        self.sink.event(SessionEvent::Connected {
            host: &self.config.host,
            port: self.config.port,
        });

        let mut transport = Framed::new(stream, ClientCodec::new());
        self.set_state(State::BannerPending);

        let banner = match transport.next().await {
            Some(Ok(Event::Banner(banner))) => banner,
            Some(Ok(Event::Frame { .. })) => {
                // A fresh codec yields the banner first; a frame here means
                // the peer is not speaking CIMD2.
                return Err(ClientCodecError::Decode(DecodeError::Failed).into());
            }
            Some(Err(error)) => return Err(error.into()),
            None => return Err(SessionError::TransportLost),
        };
        self.sink.event(SessionEvent::Banner(&banner));

        let login = Command::login(
            &self.config.username,
            &self.config.password,
            self.config.sub_addr,
            self.config.window_size,
        )?;
        let packet_number = self.counter.advance();
        self.transmit(&mut transport, &login, packet_number).await?;

        let frame = match transport.next().await {
            Some(Ok(Event::Frame { frame, raw })) => {
                self.sink.event(SessionEvent::Received(&raw));
                frame
            }
            Some(Ok(Event::Banner(_))) => {
                return Err(ClientCodecError::Decode(DecodeError::Failed).into());
            }
            Some(Err(error)) => return Err(error.into()),
            None => return Err(SessionError::TransportLost),
        };

        if let Some(error) = frame.protocol_error() {
            return Err(SessionError::LoginRejected(error));
        }
        if frame.opcode() != OpCode::LoginResponse {
            warn!("expected a login response, got opcode {}", frame.opcode());
        }
        if frame.packet_number() != packet_number.get() {
            warn!(
                "login response echoes packet {:03}, expected {packet_number}",
                frame.packet_number(),
            );
        }

        Ok(transport)
    }

    async fn transmit(
        &mut self,
        transport: &mut Transport,
        command: &Command,
        packet_number: PacketNumber,
    ) -> Result<(), SessionError> {
        let bytes = serialize(command, packet_number, self.config.use_checksum);
        self.sink.event(SessionEvent::Sent(&bytes));
        transport.send(bytes).await?;
        Ok(())
    }

    /// Correlate an inbound frame by its echoed packet number; the match is
    /// expected at the head of the queue. Frames matching nothing are
    /// dropped.
    fn dispatch(&mut self, frame: Frame) {
        let packet_number = frame.packet_number();
        let position = self
            .pending
            .iter()
            .position(|entry| entry.packet_number.get() == packet_number);

        let Some(position) = position else {
            warn!(
                "no request pending for packet {packet_number:03}, dropping opcode {}",
                frame.opcode(),
            );
            return;
        };
        if position != 0 {
            warn!("response for packet {packet_number:03} overtook {position} older requests");
        }

        let entry = match self.pending.remove(position) {
            Some(entry) => entry,
            None => return,
        };
        if let Some(expected) = entry.expected {
            if frame.opcode() != expected && !frame.opcode().is_error_response() {
                warn!(
                    "packet {packet_number:03} answered with opcode {} instead of {expected}",
                    frame.opcode(),
                );
            }
        }
        let _ = entry.reply.send(Ok(frame));
    }

    fn set_state(&mut self, state: State) {
        self.sink.event(SessionEvent::StateChanged(state));
        self.state.send_replace(state);
    }
}
