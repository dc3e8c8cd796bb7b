#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

mod camera;
mod error;
mod listener;
mod sequence;
mod udp;

pub use {
    crate::{
        camera::{Camera, CameraConfig, DEFAULT_PORT},
        error::Error,
        listener::{ListenerState, ResponseListener},
        sequence::{SequenceCounter, SEQUENCE_MODULUS},
        udp::{SocketMode, ViscaUdpChannel},
    },
    periscope_protocol as protocol,
};
pub type Result<T = ()> = std::result::Result<T, Error>;
