#![doc = include_str!("../README.md")]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate tracing;

mod argument;
pub mod encoder;
mod error;
pub mod labels;
pub mod packet;
mod registry;

pub use crate::{
    argument::{Argument, ArgumentKind, Direction},
    encoder::Encoder,
    error::Error,
    labels::LabelTable,
    packet::{CommandPacket, ControlPacket, ResponseDatagram},
    registry::{CommandRegistry, CommandSpec},
};

/// Result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
