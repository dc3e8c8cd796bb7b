//! Typed command arguments.
#[cfg(feature = "clap")]
use clap::ValueEnum;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Argument passed to [CommandSpec::get_command][crate::CommandSpec::get_command].
///
/// Each [Encoder][crate::Encoder] accepts exactly one shape (see
/// [ArgumentKind]). Commands without an encoder ignore their argument.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum Argument {
    /// No argument.
    #[default]
    None,

    /// Preset slot, `0..=15`.
    Index(u8),

    /// Human-readable label, resolved through a [LabelTable][crate::LabelTable].
    Label(String),

    /// Normalised speed, `0.0..=1.0`.
    Speed(f64),

    /// Raw byte value.
    Value(u8),

    /// Normalised speed plus the direction-specific postfix bytes of a
    /// one-shot move.
    Move { speed: f64, postfix: [u8; 3] },
}

impl Argument {
    /// Builds a [Argument::Move] for a [Direction].
    pub fn movement(direction: Direction, speed: f64) -> Self {
        Self::Move {
            speed,
            postfix: direction.postfix(),
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub const fn kind(&self) -> ArgumentKind {
        match self {
            Self::None => ArgumentKind::None,
            Self::Index(_) => ArgumentKind::Index,
            Self::Label(_) => ArgumentKind::Label,
            Self::Speed(_) => ArgumentKind::Speed,
            Self::Value(_) => ArgumentKind::Value,
            Self::Move { .. } => ArgumentKind::Move,
        }
    }
}

impl From<&str> for Argument {
    fn from(label: &str) -> Self {
        Self::Label(label.to_owned())
    }
}

impl From<String> for Argument {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

/// The argument shape a command expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentKind {
    None,
    Index,
    Label,
    Speed,
    Value,
    Move,
    /// Either [Argument::Value] or [Argument::Label].
    ValueOrLabel,
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "no",
            Self::Index => "a preset index",
            Self::Label => "a label",
            Self::Speed => "a speed",
            Self::Value => "a byte value",
            Self::Move => "a speed and direction",
            Self::ValueOrLabel => "a byte value or label",
        })
    }
}

/// Direction of a one-shot pan/tilt move.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    /// Pan direction, tilt direction and terminator.
    ///
    /// Pan: `01` left, `02` right, `03` none. Tilt: `01` up, `02` down, `03`
    /// none.
    pub const fn postfix(self) -> [u8; 3] {
        match self {
            Self::Up => [0x03, 0x01, 0xff],
            Self::Down => [0x03, 0x02, 0xff],
            Self::Left => [0x01, 0x03, 0xff],
            Self::Right => [0x02, 0x03, 0xff],
            Self::UpLeft => [0x01, 0x01, 0xff],
            Self::UpRight => [0x02, 0x01, 0xff],
            Self::DownLeft => [0x01, 0x02, 0xff],
            Self::DownRight => [0x02, 0x02, 0xff],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn postfixes_are_distinct_and_terminated() {
        for (i, a) in Direction::ALL.iter().enumerate() {
            assert_eq!(0xff, a.postfix()[2]);
            for b in &Direction::ALL[i + 1..] {
                assert_ne!(a.postfix(), b.postfix(), "{a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn movement() {
        assert_eq!(
            Argument::Move {
                speed: 0.25,
                postfix: [0x02, 0x02, 0xff],
            },
            Argument::movement(Direction::DownRight, 0.25)
        );
        assert_eq!(ArgumentKind::Move, Argument::movement(Direction::Up, 0.).kind());
    }
}
