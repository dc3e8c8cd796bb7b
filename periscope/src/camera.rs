//! High-level camera control.
use crate::{
    listener::{ListenerState, ResponseListener},
    protocol::{
        labels::{AeMode, ExAeComp, FStop, FocusMode, Gain, Shutter, WhiteBalanceMode},
        packet::CONTROL_RESET,
        Argument, CommandRegistry, Direction, ResponseDatagram,
    },
    sequence::SequenceCounter,
    udp::{SocketMode, ViscaUdpChannel},
    Result,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Duration,
};
use tokio::sync::broadcast;

/// Default port for VISCA over IP.
pub const DEFAULT_PORT: u16 = 52381;

/// Connection settings for a [Camera].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Where commands are sent.
    pub address: SocketAddr,
    /// Where the response listener binds.
    pub listen_address: SocketAddr,
    pub socket_mode: SocketMode,
    /// Pause after each received datagram.
    pub receive_throttle: Duration,
}

impl CameraConfig {
    /// Sends to `ip:port`, and listens for responses on `port` of every
    /// interface.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self {
            address: SocketAddr::new(ip, port),
            listen_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Default::default()
        }
    }

    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    pub fn with_socket_mode(mut self, socket_mode: SocketMode) -> Self {
        self.socket_mode = socket_mode;
        self
    }

    pub fn with_receive_throttle(mut self, receive_throttle: Duration) -> Self {
        self.receive_throttle = receive_throttle;
        self
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::new(192, 168, 0, 100), DEFAULT_PORT)),
            listen_address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            socket_mode: SocketMode::default(),
            receive_throttle: Duration::from_millis(100),
        }
    }
}

/// A PTZ camera driven with VISCA over UDP.
///
/// Commands are looked up by name in the [CommandRegistry], encoded with an
/// [Argument], and sent as a single datagram. Every method which sends
/// something returns the sequence number it used.
///
/// Nothing is known about whether a command was executed: the camera's
/// responses are available from [responses][Self::responses], but are not
/// matched to commands.
///
/// `Camera` is [Send] and [Sync]; commands may be sent from many tasks at once.
#[derive(Debug)]
pub struct Camera {
    registry: Arc<CommandRegistry>,
    channel: ViscaUdpChannel,
    listener: ResponseListener,
}

impl Camera {
    /// Starts listening for responses, then [resets][Self::reset] the camera.
    pub async fn connect(config: CameraConfig) -> Result<Self> {
        info!("connecting to camera at {}", config.address);
        let listener =
            ResponseListener::start(config.listen_address, config.receive_throttle).await?;

        let camera = Self {
            registry: Arc::new(CommandRegistry::standard()),
            channel: ViscaUdpChannel::new(config.address, config.socket_mode),
            listener,
        };
        camera.reset().await?;
        Ok(camera)
    }

    /// Resets the camera's session.
    ///
    /// The control datagram is sent with sequence number 1, after which the
    /// counter is put back to 0, so the next command is *also* sent as 1.
    /// Cameras have only been tested with this behaviour.
    pub async fn reset(&self) -> Result<u32> {
        let sequence = self.channel.sequence();
        sequence.force(0);
        let r = self.channel.send_control(&CONTROL_RESET).await;
        sequence.force(0);
        debug!("camera reset");
        r
    }

    /// Sends the command `name` with `argument`.
    ///
    /// Nothing is sent if the command can't be encoded.
    pub async fn invoke(&self, name: &str, argument: Argument) -> Result<u32> {
        let payload = self.registry.lookup(name)?.get_command(&argument)?;
        let sequence_number = self.channel.send_command(&payload, None).await?;
        debug!("sent {name:?} as #{sequence_number}");
        Ok(sequence_number)
    }

    /// Calls `observer` with every sequence number assigned from now on,
    /// replacing any previous observer.
    ///
    /// The observer runs on the sending task before the datagram is sent, and
    /// must not block.
    pub fn register_sequence_observer(&self, observer: impl Fn(u32) + Send + Sync + 'static) {
        self.channel.sequence().set_observer(observer);
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn sequence(&self) -> &SequenceCounter {
        self.channel.sequence()
    }

    /// Subscribes to responses received from now on.
    pub fn responses(&self) -> broadcast::Receiver<ResponseDatagram> {
        self.listener.subscribe()
    }

    pub fn listener_state(&self) -> ListenerState {
        self.listener.state()
    }

    /// Address the response listener is bound to.
    pub fn listener_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Stops the response listener and releases its socket.
    ///
    /// Commands can still be sent afterwards.
    pub async fn shutdown(&mut self) -> Result {
        info!("shutting down");
        self.listener.shutdown().await
    }

    /// Stores the current position in preset slot `index` (`0..=15`).
    pub async fn set_preset(&self, index: u8) -> Result<u32> {
        self.invoke("set preset x", Argument::Index(index)).await
    }

    /// Moves to the position stored in preset slot `index` (`0..=15`).
    pub async fn recall_preset(&self, index: u8) -> Result<u32> {
        self.invoke("recall preset x", Argument::Index(index)).await
    }

    pub async fn home(&self) -> Result<u32> {
        self.invoke("home", Argument::None).await
    }

    /// Stops pan and tilt movement.
    pub async fn stop(&self) -> Result<u32> {
        self.invoke("stop", Argument::None).await
    }

    /// Starts moving in `direction`. Movement continues until [stop][Self::stop].
    pub async fn move_direction(&self, direction: Direction, speed: f64) -> Result<u32> {
        self.invoke("move", Argument::movement(direction, speed))
            .await
    }

    pub async fn pan_relative(&self, speed: f64) -> Result<u32> {
        self.invoke("pan relative position", Argument::Speed(speed))
            .await
    }

    pub async fn zoom_tele(&self, speed: f64) -> Result<u32> {
        self.invoke("zoom tele var", Argument::Speed(speed)).await
    }

    pub async fn zoom_wide(&self, speed: f64) -> Result<u32> {
        self.invoke("zoom wide var", Argument::Speed(speed)).await
    }

    pub async fn zoom_stop(&self) -> Result<u32> {
        self.invoke("zoom stop", Argument::None).await
    }

    pub async fn focus_far(&self, speed: f64) -> Result<u32> {
        self.invoke("focus far var", Argument::Speed(speed)).await
    }

    pub async fn focus_near(&self, speed: f64) -> Result<u32> {
        self.invoke("focus near var", Argument::Speed(speed)).await
    }

    pub async fn focus_stop(&self) -> Result<u32> {
        self.invoke("focus stop", Argument::None).await
    }

    pub async fn set_focus_mode(&self, mode: FocusMode) -> Result<u32> {
        self.invoke(mode.command_name(), Argument::None).await
    }

    pub async fn set_ae_mode(&self, mode: AeMode) -> Result<u32> {
        self.invoke("ae mode", Argument::label(mode.label())).await
    }

    pub async fn set_white_balance_mode(&self, mode: WhiteBalanceMode) -> Result<u32> {
        self.invoke("wb mode", Argument::label(mode.label())).await
    }

    pub async fn set_gain(&self, gain: Gain) -> Result<u32> {
        self.invoke("gain set", Argument::Value(gain.value())).await
    }

    pub async fn set_shutter(&self, shutter: Shutter) -> Result<u32> {
        self.invoke("shutter set", Argument::Value(shutter.value()))
            .await
    }

    pub async fn set_fstop(&self, fstop: FStop) -> Result<u32> {
        self.invoke("fstop set", Argument::Value(fstop.value())).await
    }

    pub async fn set_ex_ae_comp(&self, comp: ExAeComp) -> Result<u32> {
        self.invoke("ex_ae_comp set", Argument::Value(comp.value()))
            .await
    }

    pub async fn set_ex_ae_comp_enabled(&self, enabled: bool) -> Result<u32> {
        self.switch("ex ae comp", enabled).await
    }

    pub async fn set_osd(&self, enabled: bool) -> Result<u32> {
        self.switch("osd", enabled).await
    }

    pub async fn set_digital_zoom(&self, enabled: bool) -> Result<u32> {
        self.switch("digital zoom", enabled).await
    }

    pub async fn set_low_latency(&self, enabled: bool) -> Result<u32> {
        self.switch("low latency", enabled).await
    }

    pub async fn set_backlight(&self, enabled: bool) -> Result<u32> {
        self.switch("backlight", enabled).await
    }

    /// Sends `"{prefix} on"` or `"{prefix} off"`.
    async fn switch(&self, prefix: &str, enabled: bool) -> Result<u32> {
        let name = format!("{prefix} {}", if enabled { "on" } else { "off" });
        self.invoke(&name, Argument::None).await
    }
}
