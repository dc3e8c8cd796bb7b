//! Background receiver for camera responses.
//!
//! Responses are never correlated with the commands that caused them. They are
//! logged, and published to anyone who has [subscribed][ResponseListener::subscribe].
use crate::{protocol::ResponseDatagram, Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    io::{Error as IoError, ErrorKind},
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};
use tokio::{
    net::UdpSocket,
    select,
    sync::{broadcast, watch, Notify},
    task::JoinHandle,
    time::sleep,
};

/// Largest datagram the listener will read; anything longer is truncated.
pub const RECV_BUFFER_SIZE: usize = 1024;

/// Number of responses a slow subscriber can fall behind by.
const RESPONSE_QUEUE_LENGTH: usize = 64;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ListenerState {
    #[default]
    Idle,
    Listening,
    /// Stopped by [ResponseListener::shutdown] or drop.
    Stopped,
    /// The socket returned an error which wasn't transient.
    Failed,
}

#[derive(Debug)]
pub struct ResponseListener {
    local_addr: SocketAddr,
    state_rx: watch::Receiver<ListenerState>,
    responses_tx: broadcast::Sender<ResponseDatagram>,
    stop: Arc<Notify>,
    task: Option<JoinHandle<Result>>,
}

impl ResponseListener {
    /// Binds `addr` and starts receiving on a new task.
    ///
    /// After each datagram, the task sleeps for `throttle`.
    pub async fn start(addr: SocketAddr, throttle: Duration) -> Result<Self> {
        let sock = UdpSocket::bind(addr).await.map_err(|e| {
            error!("cannot bind response listener to {addr}: {e}");
            Error::ListenerIo(e)
        })?;
        let local_addr = sock.local_addr()?;

        let (state_tx, state_rx) = watch::channel(ListenerState::Idle);
        let (responses_tx, _) = broadcast::channel(RESPONSE_QUEUE_LENGTH);
        let stop = Arc::new(Notify::new());

        info!("listening for responses on {local_addr}");
        state_tx.send_replace(ListenerState::Listening);
        let receiver = Receiver {
            sock,
            state_tx,
            responses_tx: responses_tx.clone(),
            stop: stop.clone(),
            throttle,
        };
        let task = tokio::task::spawn(async move { receiver.run().await });

        Ok(Self {
            local_addr,
            state_rx,
            responses_tx,
            stop,
            task: Some(task),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        *self.state_rx.borrow()
    }

    /// Subscribes to responses received from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ResponseDatagram> {
        self.responses_tx.subscribe()
    }

    /// Stops the listener and waits for its socket to be released.
    ///
    /// Returns the error which stopped the listener, if it had already failed.
    pub async fn shutdown(&mut self) -> Result {
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        self.stop.notify_one();
        match task.await {
            Ok(r) => r,
            Err(join_error) => {
                if join_error.is_panic() {
                    error!("response listener panicked: {join_error}");
                }
                Err(Error::Internal)
            }
        }
    }
}

impl Drop for ResponseListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.stop.notify_one();
            task.abort();
        }
    }
}

struct Receiver {
    sock: UdpSocket,
    state_tx: watch::Sender<ListenerState>,
    responses_tx: broadcast::Sender<ResponseDatagram>,
    stop: Arc<Notify>,
    throttle: Duration,
}

impl Receiver {
    async fn run(self) -> Result {
        let mut buf = [0; RECV_BUFFER_SIZE];
        loop {
            select! {
                () = self.stop.notified() => {
                    info!("stopping response listener");
                    self.state_tx.send_replace(ListenerState::Stopped);
                    return Ok(());
                }

                r = self.sock.recv_from(&mut buf) => match r {
                    Ok((len, from)) => self.handle_datagram(&buf[..len], from),
                    Err(e) => self.handle_recv_error(e)?,
                },
            }

            if !self.throttle.is_zero() {
                sleep(self.throttle).await;
            }
        }
    }

    /// Logs and swallows transient errors. Any other error moves the listener
    /// to [ListenerState::Failed] and is returned.
    fn handle_recv_error(&self, e: IoError) -> Result {
        if is_transient(&e) {
            warn!("transient receive error: {e}");
            return Ok(());
        }

        error!("response listener failed: {e}");
        self.state_tx.send_replace(ListenerState::Failed);
        Err(Error::ListenerIo(e))
    }

    fn handle_datagram(&self, raw: &[u8], from: SocketAddr) {
        let resp = match ResponseDatagram::parse(raw) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("ignoring datagram from {from} ({e}): {}", hex::encode(raw));
                return;
            }
        };

        debug!(
            "<<< {from} #{:#08x}: {}",
            resp.sequence_fragment,
            hex::encode(raw)
        );

        // No subscribers is fine.
        let _ = self.responses_tx.send(resp);
    }
}

fn is_transient(e: &IoError) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}
