//! Transport layer for VISCA over UDP.
//!
//! This typically operates over port 52381.
//!
//! Every send is fire-and-forget: one datagram, no acknowledgement, no retry,
//! no timeout.
use crate::{
    protocol::{CommandPacket, ControlPacket},
    sequence::SequenceCounter,
    Error, Result,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::{net::UdpSocket, sync::OnceCell};

/// How outbound sockets are managed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SocketMode {
    /// Bind a new socket on an ephemeral port for every datagram.
    ///
    /// Each datagram arrives at the camera from a different source port.
    #[default]
    Ephemeral,

    /// Bind one socket on first use and send every datagram from it.
    Reused,
}

/// Sends framed datagrams to a camera.
#[derive(Debug)]
pub struct ViscaUdpChannel {
    target: SocketAddr,
    mode: SocketMode,
    sequence: SequenceCounter,
    sock: OnceCell<UdpSocket>,
}

impl ViscaUdpChannel {
    pub fn new(target: SocketAddr, mode: SocketMode) -> Self {
        Self {
            target,
            mode,
            sequence: SequenceCounter::new(),
            sock: OnceCell::new(),
        }
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    pub fn mode(&self) -> SocketMode {
        self.mode
    }

    pub fn sequence(&self) -> &SequenceCounter {
        &self.sequence
    }

    /// Sends a control payload, returning the sequence number used.
    pub async fn send_control(&self, payload: &[u8]) -> Result<u32> {
        let mut pkt = ControlPacket::new(0, payload.to_vec())?;
        pkt.sequence_number = self.sequence.next_sequence();
        let out = pkt.to_bytes()?;
        trace!(
            "control #{} >>> {}",
            pkt.sequence_number,
            hex::encode(&out)
        );
        self.send_datagram(&out).await?;
        Ok(pkt.sequence_number)
    }

    /// Sends a command payload, returning the sequence number used.
    ///
    /// `header` defaults to
    /// [DEFAULT_COMMAND_HEADER][crate::protocol::packet::DEFAULT_COMMAND_HEADER].
    pub async fn send_command(&self, payload: &[u8], header: Option<[u8; 2]>) -> Result<u32> {
        let mut pkt = CommandPacket::new(header, 0, payload.to_vec())?;
        pkt.sequence_number = self.sequence.next_sequence();
        let out = pkt.to_bytes()?;
        trace!(
            "command #{} >>> {}",
            pkt.sequence_number,
            hex::encode(&out)
        );
        self.send_datagram(&out).await?;
        Ok(pkt.sequence_number)
    }

    async fn send_datagram(&self, out: &[u8]) -> Result {
        let sent = match self.mode {
            SocketMode::Ephemeral => {
                let sock = bind_unspecified(self.target).await.map_err(Error::Transport)?;
                sock.send_to(out, self.target).await
            }
            SocketMode::Reused => {
                let sock = self
                    .sock
                    .get_or_try_init(|| bind_unspecified(self.target))
                    .await
                    .map_err(Error::Transport)?;
                sock.send_to(out, self.target).await
            }
        };

        let sent = sent.map_err(|e| {
            error!("error sending to {}: {e}", self.target);
            Error::Transport(e)
        })?;
        if sent != out.len() {
            warn!("short send to {}: {sent} of {} bytes", self.target, out.len());
        }
        Ok(())
    }
}

/// Binds an ephemeral port of the same address family as `target`.
async fn bind_unspecified(target: SocketAddr) -> std::io::Result<UdpSocket> {
    let local = match target {
        SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
    };
    UdpSocket::bind(local).await
}
