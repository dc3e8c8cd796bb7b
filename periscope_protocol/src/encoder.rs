//! Argument encoders.
//!
//! An [Encoder] turns a command template and an [Argument] into the payload
//! bytes sent to the camera. Encoders never modify the template: every call
//! works on its own copy.
//!
//! ## Speed scaling
//!
//! Speeds are normalised to `0.0..=1.0` and scaled by truncation:
//!
//! * pan: `floor(speed * 0x17) + 1`, `0x01..=0x18`
//! * tilt: `floor(speed * 0x13) + 1`, `0x01..=0x14`
//! * zoom and focus: `floor(speed * 6) + 1`, `1..=7` (`7` only at exactly
//!   `1.0`)
use crate::{Argument, ArgumentKind, Error, LabelTable, Result};

/// Slowest pan speed byte.
pub const MIN_PAN_SPEED: u8 = 0x01;
/// Fastest pan speed byte.
pub const MAX_PAN_SPEED: u8 = 0x18;
/// Slowest tilt speed byte.
pub const MIN_TILT_SPEED: u8 = 0x01;
/// Fastest tilt speed byte.
pub const MAX_TILT_SPEED: u8 = 0x14;

/// [Encoder::VariableSpeed] base for zoom tele and focus far.
pub const TELE_BASE: u8 = 0x20;
/// [Encoder::VariableSpeed] base for zoom wide and focus near.
pub const WIDE_BASE: u8 = 0x30;

/// Highest preset slot.
pub const MAX_PRESET_INDEX: u8 = 0x0f;

/// Relative pan/tilt position bytes; these are fixed for every move.
const RELATIVE_POSITION: [u8; 8] = [0x0a; 8];

const TERMINATOR: u8 = 0xff;

/// Closed set of argument encoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoder {
    /// Writes the preset slot into byte 5.
    PresetIndex,

    /// Appends pan and tilt speeds, 8 position bytes and a terminator.
    PanTiltRelative,

    /// Appends pan and tilt speeds and a 3 byte direction postfix.
    OneshotPtz,

    /// Writes `base + step` into byte 4, where `step` is the scaled speed.
    VariableSpeed { base: u8 },

    /// Splits a byte into nibbles in bytes 6 and 7.
    ///
    /// Accepts a raw [Argument::Value], or an [Argument::Label] resolved
    /// through the table.
    ExposureValue(&'static LabelTable),

    /// Writes the table value for an [Argument::Label] into byte 4.
    EnumMode(&'static LabelTable),
}

impl Encoder {
    pub const fn argument_kind(&self) -> ArgumentKind {
        match self {
            Self::PresetIndex => ArgumentKind::Index,
            Self::PanTiltRelative | Self::VariableSpeed { .. } => ArgumentKind::Speed,
            Self::OneshotPtz => ArgumentKind::Move,
            Self::ExposureValue(_) => ArgumentKind::ValueOrLabel,
            Self::EnumMode(_) => ArgumentKind::Label,
        }
    }

    /// The label table used by this encoder, if any.
    pub const fn labels(&self) -> Option<&'static LabelTable> {
        match self {
            Self::ExposureValue(t) | Self::EnumMode(t) => Some(*t),
            _ => None,
        }
    }

    /// Encodes `argument` into a copy of `template`.
    ///
    /// `command` is only used for error reporting.
    ///
    /// ## Errors
    ///
    /// * [Error::ArgumentShapeMismatch] when `argument` is not the shape this
    ///   encoder expects
    /// * [Error::ParameterOutOfRange] for preset slots above
    ///   [MAX_PRESET_INDEX], and speeds outside `0.0..=1.0`
    /// * [Error::UnknownEnumValue] for labels missing from the table
    /// * [Error::InvalidLength] if `template` is too short for the encoder
    pub fn encode(
        &self,
        command: &'static str,
        template: &[u8],
        argument: &Argument,
    ) -> Result<Vec<u8>> {
        let mismatch = || {
            error!(
                "command {command:?} expects {} argument, got {:?}",
                self.argument_kind(),
                argument.kind()
            );
            Error::ArgumentShapeMismatch {
                command,
                expected: self.argument_kind(),
            }
        };

        let mut data = template.to_vec();
        match (self, argument) {
            (Self::PresetIndex, &Argument::Index(index)) => {
                if index > MAX_PRESET_INDEX {
                    error!("preset index {index} out of range");
                    return Err(Error::ParameterOutOfRange);
                }
                set_byte(&mut data, 5, index)?;
            }

            (Self::PanTiltRelative, &Argument::Speed(speed)) => {
                let (pan, tilt) = pan_tilt_speeds(speed)?;
                data.extend_from_slice(&[pan, tilt]);
                data.extend_from_slice(&RELATIVE_POSITION);
                data.push(TERMINATOR);
            }

            (Self::OneshotPtz, &Argument::Move { speed, postfix }) => {
                let (pan, tilt) = pan_tilt_speeds(speed)?;
                data.extend_from_slice(&[pan, tilt]);
                data.extend_from_slice(&postfix);
            }

            (&Self::VariableSpeed { base }, &Argument::Speed(speed)) => {
                set_byte(&mut data, 4, base + variable_speed_step(speed)?)?;
            }

            (Self::ExposureValue(_), &Argument::Value(value)) => {
                split_nibbles(&mut data, value)?;
            }

            (Self::ExposureValue(table), Argument::Label(label)) => {
                split_nibbles(&mut data, table.lookup(label)?)?;
            }

            (Self::EnumMode(table), Argument::Label(label)) => {
                set_byte(&mut data, 4, table.lookup(label)?)?;
            }

            _ => return Err(mismatch()),
        }

        Ok(data)
    }
}

fn check_speed(speed: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&speed) {
        Ok(speed)
    } else {
        error!("speed {speed} out of range");
        Err(Error::ParameterOutOfRange)
    }
}

/// Scales a normalised speed to `(pan, tilt)` speed bytes.
pub fn pan_tilt_speeds(speed: f64) -> Result<(u8, u8)> {
    let speed = check_speed(speed)?;
    let pan = (speed * f64::from(MAX_PAN_SPEED - 1)).floor() as u8 + 1;
    let tilt = (speed * f64::from(MAX_TILT_SPEED - 1)).floor() as u8 + 1;
    Ok((pan, tilt))
}

/// Scales a normalised speed to a zoom/focus step.
pub fn variable_speed_step(speed: f64) -> Result<u8> {
    let speed = check_speed(speed)?;
    Ok((speed * 6.).floor() as u8 + 1)
}

fn set_byte(data: &mut [u8], offset: usize, value: u8) -> Result {
    let b = data.get_mut(offset).ok_or_else(|| {
        error!("template too short to set byte {offset}");
        Error::InvalidLength
    })?;
    *b = value;
    Ok(())
}

fn split_nibbles(data: &mut [u8], value: u8) -> Result {
    set_byte(data, 6, value >> 4)?;
    set_byte(data, 7, value & 0x0f)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::labels::{AeMode, Gain, WhiteBalanceMode};
    use rand::Rng;

    const ZOOM: [u8; 6] = [0x81, 0x01, 0x04, 0x07, 0x00, 0xff];
    const EXPOSURE: [u8; 9] = [0x81, 0x01, 0x04, 0x4c, 0x00, 0x00, 0x00, 0x00, 0xff];

    #[test]
    fn speed_bounds() -> Result<()> {
        assert_eq!((1, 1), pan_tilt_speeds(0.)?);
        assert_eq!((MAX_PAN_SPEED, MAX_TILT_SPEED), pan_tilt_speeds(1.)?);
        assert_eq!((12, 10), pan_tilt_speeds(0.5)?);

        let mut rng = rand::rng();
        for _ in 0..1000 {
            let speed = rng.random_range(0.0..=1.0);
            let (pan, tilt) = pan_tilt_speeds(speed)?;
            assert!((MIN_PAN_SPEED..=MAX_PAN_SPEED).contains(&pan), "{speed} -> {pan}");
            assert!((MIN_TILT_SPEED..=MAX_TILT_SPEED).contains(&tilt), "{speed} -> {tilt}");
        }

        assert!(matches!(pan_tilt_speeds(1.01), Err(Error::ParameterOutOfRange)));
        assert!(matches!(pan_tilt_speeds(-0.1), Err(Error::ParameterOutOfRange)));
        assert!(matches!(variable_speed_step(f64::NAN), Err(Error::ParameterOutOfRange)));
        Ok(())
    }

    #[test]
    fn variable_speed() -> Result<()> {
        let tele = Encoder::VariableSpeed { base: TELE_BASE };
        let wide = Encoder::VariableSpeed { base: WIDE_BASE };

        assert_eq!(
            hex::decode("8101040724ff")?,
            tele.encode("zoom tele var", &ZOOM, &Argument::Speed(0.5))?
        );
        assert_eq!(0x21, tele.encode("zoom tele var", &ZOOM, &Argument::Speed(0.))?[4]);
        assert_eq!(0x31, wide.encode("zoom wide var", &ZOOM, &Argument::Speed(0.))?[4]);
        assert_eq!(0x36, wide.encode("zoom wide var", &ZOOM, &Argument::Speed(0.99))?[4]);
        assert_eq!(0x37, wide.encode("zoom wide var", &ZOOM, &Argument::Speed(1.))?[4]);
        Ok(())
    }

    #[test]
    fn template_untouched() -> Result<()> {
        let tele = Encoder::VariableSpeed { base: TELE_BASE };
        let template = ZOOM;
        let a = tele.encode("zoom tele var", &template, &Argument::Speed(1.))?;
        let b = tele.encode("zoom tele var", &template, &Argument::Speed(0.))?;
        assert_ne!(a, b);
        assert_eq!(ZOOM, template);
        Ok(())
    }

    #[test]
    fn preset() -> Result<()> {
        let template = [0x81, 0x01, 0x04, 0x3f, 0x01, 0x00, 0xff];
        assert_eq!(
            hex::decode("8101043f0107ff")?,
            Encoder::PresetIndex.encode("set preset x", &template, &Argument::Index(7))?
        );
        assert_eq!(
            hex::decode("8101043f010fff")?,
            Encoder::PresetIndex.encode("set preset x", &template, &Argument::Index(15))?
        );
        assert!(matches!(
            Encoder::PresetIndex.encode("set preset x", &template, &Argument::Index(16)),
            Err(Error::ParameterOutOfRange)
        ));
        Ok(())
    }

    #[test]
    fn pan_tilt_relative() -> Result<()> {
        let template = [0x81, 0x01, 0x06, 0x03];
        assert_eq!(
            hex::decode(concat!("810106030101", "0a0a0a0a0a0a0a0a", "ff"))?,
            Encoder::PanTiltRelative.encode("pan relative position", &template, &Argument::Speed(0.))?
        );
        assert_eq!(
            hex::decode(concat!("810106031814", "0a0a0a0a0a0a0a0a", "ff"))?,
            Encoder::PanTiltRelative.encode("pan relative position", &template, &Argument::Speed(1.))?
        );
        Ok(())
    }

    #[test]
    fn oneshot() -> Result<()> {
        let template = [0x81, 0x01, 0x06, 0x01];
        let arg = Argument::Move {
            speed: 0.5,
            postfix: [0x03, 0x01, 0xff],
        };
        assert_eq!(
            hex::decode("810106010c0a0301ff")?,
            Encoder::OneshotPtz.encode("move", &template, &arg)?
        );
        Ok(())
    }

    #[test]
    fn exposure() -> Result<()> {
        let e = Encoder::ExposureValue(&Gain::TABLE);
        assert_eq!(
            hex::decode("8101044c00000102ff")?,
            e.encode("gain set", &EXPOSURE, &Argument::Value(0x12))?
        );
        assert_eq!(
            hex::decode("8101044c00000007ff")?,
            e.encode("gain set", &EXPOSURE, &Argument::label("18dB"))?
        );
        assert!(matches!(
            e.encode("gain set", &EXPOSURE, &Argument::label("100dB")),
            Err(Error::UnknownEnumValue { table: "gain", .. })
        ));
        Ok(())
    }

    #[test]
    fn enum_mode() -> Result<()> {
        let template = [0x81, 0x01, 0x04, 0x39, 0x00, 0xff];
        let ae = Encoder::EnumMode(&AeMode::TABLE);
        assert_eq!(
            hex::decode("810104390bff")?,
            ae.encode("ae mode", &template, &Argument::label("Av"))?
        );

        let wb = Encoder::EnumMode(&WhiteBalanceMode::TABLE);
        assert_eq!(
            hex::decode("8101043904ff")?,
            wb.encode("wb mode", &template, &Argument::label("Auto Tracking"))?
        );
        assert!(matches!(
            wb.encode("wb mode", &template, &Argument::label("Tungsten")),
            Err(Error::UnknownEnumValue { .. })
        ));
        Ok(())
    }

    #[test]
    fn shape_mismatch() {
        let template = [0x81, 0x01, 0x06, 0x01];
        let Err(Error::ArgumentShapeMismatch { command, expected }) =
            Encoder::OneshotPtz.encode("move", &template, &Argument::Speed(0.5))
        else {
            panic!("expected ArgumentShapeMismatch");
        };
        assert_eq!("move", command);
        assert_eq!(ArgumentKind::Move, expected);

        assert!(matches!(
            Encoder::PresetIndex.encode("set preset x", &template, &Argument::None),
            Err(Error::ArgumentShapeMismatch { expected: ArgumentKind::Index, .. })
        ));
    }

    #[test]
    fn short_template() {
        assert!(matches!(
            Encoder::PresetIndex.encode("short", &[0x81, 0xff], &Argument::Index(1)),
            Err(Error::InvalidLength)
        ));
    }
}
