//! Human-readable labels for mode and exposure settings.
//!
//! Every table here is a `#[repr(u8)]` enum whose discriminants are the bytes
//! the camera expects, plus a [LabelTable] for looking values up by label
//! (as a UI combo box would).
//!
//! Table | Command | Encoding
//! ----- | ------- | --------
//! [AeMode] | `ae mode` | byte 4
//! [WhiteBalanceMode] | `wb mode` | byte 4
//! [FStop] | `fstop set` | nibbles in bytes 6, 7
//! [Shutter] | `shutter set` | nibbles in bytes 6, 7
//! [Gain] | `gain set` | nibbles in bytes 6, 7
//! [ExAeComp] | `ex_ae_comp set` | nibbles in bytes 6, 7
use crate::{Error, Result};
use num_traits::FromPrimitive;

/// Fixed label to byte mapping.
#[derive(Debug, PartialEq, Eq)]
pub struct LabelTable {
    /// Name of the setting, used in error messages.
    pub name: &'static str,
    pub entries: &'static [(&'static str, u8)],
}

impl LabelTable {
    /// Looks up the byte for `label`.
    ///
    /// ## Errors
    ///
    /// * [Error::UnknownEnumValue] when `label` is not in the table.
    pub fn lookup(&self, label: &str) -> Result<u8> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|&(_, v)| v)
            .ok_or_else(|| {
                error!("unknown {} value: {label:?}", self.name);
                Error::UnknownEnumValue {
                    table: self.name,
                    value: label.to_owned(),
                }
            })
    }

    /// Finds the label for a byte value.
    pub fn label_for(&self, value: u8) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|&&(_, v)| v == value)
            .map(|&(l, _)| l)
    }

    /// Labels in display order.
    pub fn labels(&self) -> impl Iterator<Item = &'static str> {
        self.entries.iter().map(|&(l, _)| l)
    }

    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($table:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:literal => $label:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Hash)]
        #[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )*
        }

        impl $name {
            /// All values, in display order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            pub const TABLE: LabelTable = LabelTable {
                name: $table,
                entries: &[$(($label, $value),)*],
            };

            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }

            pub const fn value(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = Error;

            fn try_from(value: u8) -> Result<Self> {
                Self::from_u8(value).ok_or(Error::ParameterOutOfRange)
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(label: &str) -> Result<Self> {
                Self::try_from(Self::TABLE.lookup(label)?)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum! {
    /// Auto-exposure mode.
    pub enum AeMode ("auto-exposure mode") {
        FullAuto = 0x00 => "Full Auto",
        Manual = 0x03 => "Manual",
        /// Shutter priority.
        Tv = 0x0a => "Tv",
        /// Iris priority.
        Av = 0x0b => "Av",
        Brightness = 0x0d => "Brightness",
    }
}

labelled_enum! {
    /// White balance mode.
    pub enum WhiteBalanceMode ("white balance mode") {
        Auto = 0x00 => "Auto",
        Indoor = 0x01 => "Indoor",
        Outdoor = 0x02 => "Outdoor",
        /// Set with `wb mode trigger`.
        OnePush = 0x03 => "One Push",
        AutoTracking = 0x04 => "Auto Tracking",
        Manual = 0x05 => "Manual",
    }
}

labelled_enum! {
    /// Iris position.
    pub enum FStop ("f-stop") {
        F1_8 = 0x11 => "f/1.8",
        F2_0 = 0x10 => "f/2.0",
        F2_4 = 0x0f => "f/2.4",
        F2_8 = 0x0e => "f/2.8",
        F3_4 = 0x0d => "f/3.4",
        F4_0 = 0x0c => "f/4.0",
        F4_8 = 0x0b => "f/4.8",
        F5_6 = 0x0a => "f/5.6",
        F6_8 = 0x09 => "f/6.8",
        F8_0 = 0x08 => "f/8.0",
        F9_6 = 0x07 => "f/9.6",
        F11_0 = 0x06 => "f/11.0",
        F14_0 = 0x05 => "f/14.0",
        Closed = 0x00 => "Closed",
    }
}

labelled_enum! {
    /// Shutter speed. Labels give the speed for both frame-rate families.
    pub enum Shutter ("shutter speed") {
        S250 = 0x0b => "1/250 | 1/215",
        S180 = 0x0a => "1/180 | 1/150",
        S125 = 0x09 => "1/125 | 1/120",
        S100 = 0x08 => "1/100 | 1/100",
        S90 = 0x07 => "1/90 | 1/75",
        S60 = 0x06 => "1/60 | 1/50",
        S30 = 0x05 => "1/30 | 1/25",
    }
}

labelled_enum! {
    /// Exposure gain.
    pub enum Gain ("gain") {
        Db0 = 0x01 => "0dB",
        Db3 = 0x02 => "3dB",
        Db6 = 0x03 => "6dB",
        Db9 = 0x04 => "9dB",
        Db12 = 0x05 => "12dB",
        Db15 = 0x06 => "15dB",
        Db18 = 0x07 => "18dB",
        Db21 = 0x08 => "21dB",
        Db24 = 0x09 => "24dB",
        Db27 = 0x0a => "27dB",
        Db30 = 0x0b => "30dB",
        Db33 = 0x0c => "33dB",
        Db36 = 0x0d => "36dB",
        Db39 = 0x0e => "39dB",
        Db43 = 0x0f => "43dB",
    }
}

labelled_enum! {
    /// Exposure compensation.
    pub enum ExAeComp ("exposure compensation") {
        Minus10_5 = 0x00 => "-10.5dB",
        Minus9 = 0x01 => "-9dB",
        Minus7_5 = 0x02 => "-7.5dB",
        Minus6 = 0x03 => "-6dB",
        Minus4_5 = 0x04 => "-4.5dB",
        Minus3 = 0x05 => "-3dB",
        Minus1_5 = 0x06 => "-1.5dB",
        Zero = 0x07 => "0dB",
        Plus1_5 = 0x08 => "+1.5dB",
        Plus3 = 0x09 => "+3dB",
        Plus4_5 = 0x0a => "+4.5dB",
        Plus6 = 0x0b => "+6dB",
        Plus7_5 = 0x0c => "+7.5dB",
        Plus9 = 0x0d => "+9dB",
        Plus10_5 = 0x0e => "+10.5dB",
    }
}

/// Focus mode selector.
///
/// Unlike the other tables, each mode is a separate command rather than a
/// byte in a shared template.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FocusMode {
    On,
    Manual,
    AutoManual,
    OnePushTrigger,
}

impl FocusMode {
    pub const ALL: [Self; 4] = [
        Self::On,
        Self::Manual,
        Self::AutoManual,
        Self::OnePushTrigger,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Manual => "Manual",
            Self::AutoManual => "Auto/Manual",
            Self::OnePushTrigger => "One Push Trigger",
        }
    }

    /// Name of the registry command which selects this mode.
    pub const fn command_name(self) -> &'static str {
        match self {
            Self::On => "af mode auto",
            Self::Manual => "af mode manual",
            Self::AutoManual => "af mode auto/manual",
            Self::OnePushTrigger => "af mode one push trigger",
        }
    }
}

impl std::str::FromStr for FocusMode {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == label)
            .ok_or_else(|| Error::UnknownEnumValue {
                table: "focus mode",
                value: label.to_owned(),
            })
    }
}

impl std::fmt::Display for FocusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup() -> Result<()> {
        assert_eq!(0x07, Gain::TABLE.lookup("18dB")?);
        assert_eq!(0x0d, AeMode::TABLE.lookup("Brightness")?);
        assert_eq!(0x03, WhiteBalanceMode::TABLE.lookup("One Push")?);
        assert_eq!(0x00, FStop::TABLE.lookup("Closed")?);
        assert_eq!(Some("+1.5dB"), ExAeComp::TABLE.label_for(0x08));
        assert_eq!(None, Shutter::TABLE.label_for(0x00));

        let Err(Error::UnknownEnumValue { table, value }) = AeMode::TABLE.lookup("Sport") else {
            panic!("expected UnknownEnumValue");
        };
        assert_eq!("auto-exposure mode", table);
        assert_eq!("Sport", value);
        Ok(())
    }

    #[test]
    fn tables_match_enums() {
        fn check<T: Copy + std::fmt::Debug + PartialEq + std::str::FromStr>(
            all: &[T],
            table: &LabelTable,
            value: impl Fn(T) -> u8,
        ) where
            T::Err: std::fmt::Debug,
        {
            assert_eq!(all.len(), table.len());
            for (&v, &(label, byte)) in all.iter().zip(table.entries) {
                assert_eq!(byte, value(v));
                assert_eq!(v, label.parse::<T>().unwrap());
            }
        }

        check(AeMode::ALL, &AeMode::TABLE, AeMode::value);
        check(WhiteBalanceMode::ALL, &WhiteBalanceMode::TABLE, WhiteBalanceMode::value);
        check(FStop::ALL, &FStop::TABLE, FStop::value);
        check(Shutter::ALL, &Shutter::TABLE, Shutter::value);
        check(Gain::ALL, &Gain::TABLE, Gain::value);
        check(ExAeComp::ALL, &ExAeComp::TABLE, ExAeComp::value);
    }

    #[test]
    fn exhaustive_labels() {
        assert_eq!(
            vec!["Full Auto", "Manual", "Tv", "Av", "Brightness"],
            AeMode::TABLE.labels().collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["Auto", "Indoor", "Outdoor", "One Push", "Auto Tracking", "Manual"],
            WhiteBalanceMode::TABLE.labels().collect::<Vec<_>>()
        );
        assert_eq!(14, FStop::TABLE.len());
        assert_eq!(7, Shutter::TABLE.len());
        assert_eq!(15, Gain::TABLE.len());
        assert_eq!(15, ExAeComp::TABLE.len());
    }

    #[test]
    fn from_byte() {
        assert_eq!(Gain::Db43, Gain::try_from(0x0f).unwrap());
        assert!(matches!(Gain::try_from(0x00), Err(Error::ParameterOutOfRange)));
        assert_eq!("f/5.6", FStop::F5_6.to_string());
    }

    #[test]
    fn focus_mode() {
        assert_eq!(FocusMode::AutoManual, "Auto/Manual".parse().unwrap());
        assert_eq!("af mode one push trigger", FocusMode::OnePushTrigger.command_name());
        assert!("Off".parse::<FocusMode>().is_err());
    }
}
