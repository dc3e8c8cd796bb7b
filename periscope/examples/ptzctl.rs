use clap::{Parser, Subcommand};
use periscope::{
    protocol::{labels::Gain, Argument, Direction},
    Camera, CameraConfig, Result, SocketMode,
};
use std::{net::IpAddr, time::Duration};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

/// VISCA-over-IP PTZ camera controller.
///
/// Every command sends a single datagram; the camera does not report whether
/// it was executed. Set RUST_LOG=periscope=trace to see the bytes on the wire.
#[derive(Debug, Parser)]
#[clap(verbatim_doc_comment)]
struct CliParser {
    /// IP address of the camera.
    #[clap(short, long)]
    pub ip: IpAddr,

    /// UDP port of the camera.
    #[clap(short, long, default_value_t = periscope::DEFAULT_PORT)]
    pub port: u16,

    /// Send every datagram from the same local port.
    #[clap(long)]
    pub reuse_socket: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists every command the camera understands, and its argument.
    List,

    /// Sends a command by name.
    ///
    /// At most one argument option may be given.
    Send {
        /// Command name, eg: "zoom tele var".
        name: String,

        /// Preset slot.
        #[clap(long, group = "argument")]
        index: Option<u8>,

        /// Normalised speed, 0.0 to 1.0.
        #[clap(long, group = "argument")]
        speed: Option<f64>,

        /// Label for mode and exposure commands, eg: "18dB".
        #[clap(long, group = "argument")]
        label: Option<String>,

        /// Raw value for exposure commands.
        #[clap(long, group = "argument")]
        value: Option<u8>,
    },

    /// Moves in a direction for a while, then stops.
    Move {
        #[clap(value_enum)]
        direction: Direction,

        #[clap(long, default_value_t = 0.5)]
        speed: f64,

        /// How long to move for, in milliseconds.
        #[clap(long, default_value_t = 500)]
        duration: u64,
    },

    /// Sets the gain.
    Gain {
        #[clap(value_enum)]
        gain: Gain,
    },

    /// Logs responses from the camera until interrupted.
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .compact()
        .init();
    let opts = CliParser::parse();

    if let Command::List = opts.command {
        let registry = periscope::protocol::CommandRegistry::standard();
        for spec in registry.iter() {
            match spec.labels() {
                Some(table) => info!(
                    "{:?}: {} argument ({})",
                    spec.name,
                    spec.argument_kind(),
                    table.labels().collect::<Vec<_>>().join(", ")
                ),
                None => info!("{:?}: {} argument", spec.name, spec.argument_kind()),
            }
        }
        return Ok(());
    }

    let mut config = CameraConfig::new(opts.ip, opts.port);
    if opts.reuse_socket {
        config = config.with_socket_mode(SocketMode::Reused);
    }
    let camera = Camera::connect(config).await?;
    camera.register_sequence_observer(|n| tracing::debug!("sequence number {n}"));

    match opts.command {
        Command::List => unreachable!("handled before connecting"),

        Command::Send {
            name,
            index,
            speed,
            label,
            value,
        } => {
            let argument = if let Some(index) = index {
                Argument::Index(index)
            } else if let Some(speed) = speed {
                Argument::Speed(speed)
            } else if let Some(label) = label {
                Argument::Label(label)
            } else if let Some(value) = value {
                Argument::Value(value)
            } else {
                Argument::None
            };
            let n = camera.invoke(&name, argument).await?;
            info!("sent {name:?} as #{n}");
        }

        Command::Move {
            direction,
            speed,
            duration,
        } => {
            camera.move_direction(direction, speed).await?;
            tokio::time::sleep(Duration::from_millis(duration)).await;
            camera.stop().await?;
        }

        Command::Gain { gain } => {
            let n = camera.set_gain(gain).await?;
            info!("set gain to {gain} as #{n}");
        }

        Command::Watch => {
            let mut responses = camera.responses();
            loop {
                match responses.recv().await {
                    Ok(resp) => info!(
                        "response #{:#08x}: {:02x?}",
                        resp.sequence_fragment,
                        resp.trailer()
                    ),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!("missed {n} responses");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    Ok(())
}
