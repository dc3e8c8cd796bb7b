//! Command catalog.
//!
//! Every command is a VISCA instruction template (`8x ... FF`), optionally
//! parameterised by an [Encoder].
use crate::{
    encoder::{TELE_BASE, WIDE_BASE},
    labels::{AeMode, ExAeComp, FStop, Gain, Shutter, WhiteBalanceMode},
    Argument, ArgumentKind, Encoder, Error, LabelTable, Result,
};
use std::collections::HashMap;

/// A named command: a byte template plus an optional [Encoder].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    /// Unparameterised payload. Complete templates end in `0xFF`; templates
    /// for [Encoder::PanTiltRelative] and [Encoder::OneshotPtz] are prefixes
    /// that the encoder terminates.
    pub template: &'static [u8],
    pub encoder: Option<Encoder>,
}

impl CommandSpec {
    const fn fixed(name: &'static str, template: &'static [u8]) -> Self {
        Self {
            name,
            template,
            encoder: None,
        }
    }

    const fn encoded(name: &'static str, template: &'static [u8], encoder: Encoder) -> Self {
        Self {
            name,
            template,
            encoder: Some(encoder),
        }
    }

    /// Builds the payload for this command.
    ///
    /// Commands without an encoder return their template whatever
    /// `argument` is.
    pub fn get_command(&self, argument: &Argument) -> Result<Vec<u8>> {
        match &self.encoder {
            None => Ok(self.template.to_vec()),
            Some(encoder) => encoder.encode(self.name, self.template, argument),
        }
    }

    pub const fn argument_kind(&self) -> ArgumentKind {
        match &self.encoder {
            None => ArgumentKind::None,
            Some(encoder) => encoder.argument_kind(),
        }
    }

    /// The labels this command accepts, for enum-mode and exposure commands.
    pub const fn labels(&self) -> Option<&'static LabelTable> {
        match &self.encoder {
            None => None,
            Some(encoder) => encoder.labels(),
        }
    }
}

static STANDARD_COMMANDS: [CommandSpec; 43] = [
    CommandSpec::fixed("backlight on", &[0x81, 0x01, 0x04, 0x33, 0x03, 0xff]),
    CommandSpec::fixed("backlight off", &[0x81, 0x01, 0x04, 0x33, 0x02, 0xff]),
    CommandSpec::encoded(
        "set preset x",
        &[0x81, 0x01, 0x04, 0x3f, 0x01, 0x00, 0xff],
        Encoder::PresetIndex,
    ),
    CommandSpec::encoded(
        "recall preset x",
        &[0x81, 0x01, 0x04, 0x3f, 0x02, 0x00, 0xff],
        Encoder::PresetIndex,
    ),
    CommandSpec::fixed("home", &[0x81, 0x01, 0x06, 0x04, 0xff]),
    CommandSpec::encoded(
        "pan relative position",
        &[0x81, 0x01, 0x06, 0x03],
        Encoder::PanTiltRelative,
    ),
    CommandSpec::encoded("move", &[0x81, 0x01, 0x06, 0x01], Encoder::OneshotPtz),
    CommandSpec::fixed(
        "stop",
        &[0x81, 0x01, 0x06, 0x01, 0x01, 0x01, 0x03, 0x03, 0xff],
    ),
    CommandSpec::fixed("osd on", &[0x81, 0x01, 0x7e, 0x01, 0x18, 0x02, 0xff]),
    CommandSpec::fixed("osd off", &[0x81, 0x01, 0x7e, 0x01, 0x18, 0x03, 0xff]),
    CommandSpec::fixed("low latency on", &[0x81, 0x01, 0x7e, 0x01, 0x5a, 0x02, 0xff]),
    CommandSpec::fixed("low latency off", &[0x81, 0x01, 0x7e, 0x01, 0x5a, 0x03, 0xff]),
    CommandSpec::fixed("zoom stop", &[0x81, 0x01, 0x04, 0x07, 0x00, 0xff]),
    CommandSpec::fixed("digital zoom on", &[0x81, 0x01, 0x04, 0x06, 0x02, 0xff]),
    CommandSpec::fixed("digital zoom off", &[0x81, 0x01, 0x04, 0x06, 0x03, 0xff]),
    CommandSpec::fixed("zoom tele std", &[0x81, 0x01, 0x04, 0x07, 0x02, 0xff]),
    CommandSpec::fixed("zoom wide std", &[0x81, 0x01, 0x04, 0x07, 0x03, 0xff]),
    CommandSpec::encoded(
        "zoom tele var",
        &[0x81, 0x01, 0x04, 0x07, 0x00, 0xff],
        Encoder::VariableSpeed { base: TELE_BASE },
    ),
    CommandSpec::encoded(
        "zoom wide var",
        &[0x81, 0x01, 0x04, 0x07, 0x00, 0xff],
        Encoder::VariableSpeed { base: WIDE_BASE },
    ),
    CommandSpec::encoded(
        "ae mode",
        &[0x81, 0x01, 0x04, 0x39, 0x00, 0xff],
        Encoder::EnumMode(&AeMode::TABLE),
    ),
    CommandSpec::fixed("brighter", &[0x81, 0x01, 0x04, 0x0d, 0x02, 0xff]),
    CommandSpec::fixed("darker", &[0x81, 0x01, 0x04, 0x0d, 0x03, 0xff]),
    CommandSpec::fixed("af mode auto", &[0x81, 0x01, 0x04, 0x38, 0x02, 0xff]),
    CommandSpec::fixed("af mode manual", &[0x81, 0x01, 0x04, 0x38, 0x03, 0xff]),
    CommandSpec::fixed("af mode auto/manual", &[0x81, 0x01, 0x04, 0x38, 0x10, 0xff]),
    CommandSpec::fixed(
        "af mode one push trigger",
        &[0x81, 0x01, 0x04, 0x18, 0x01, 0xff],
    ),
    CommandSpec::encoded(
        "focus far var",
        &[0x81, 0x01, 0x04, 0x08, 0x00, 0xff],
        Encoder::VariableSpeed { base: TELE_BASE },
    ),
    CommandSpec::encoded(
        "focus near var",
        &[0x81, 0x01, 0x04, 0x08, 0x00, 0xff],
        Encoder::VariableSpeed { base: WIDE_BASE },
    ),
    CommandSpec::fixed("focus stop", &[0x81, 0x01, 0x04, 0x08, 0x00, 0xff]),
    CommandSpec::encoded(
        "wb mode",
        &[0x81, 0x01, 0x04, 0x35, 0x00, 0xff],
        Encoder::EnumMode(&WhiteBalanceMode::TABLE),
    ),
    CommandSpec::fixed("wb mode trigger", &[0x81, 0x01, 0x04, 0x10, 0x05, 0xff]),
    CommandSpec::fixed("red gain up", &[0x81, 0x01, 0x04, 0x03, 0x02, 0xff]),
    CommandSpec::fixed("red gain down", &[0x81, 0x01, 0x04, 0x03, 0x03, 0xff]),
    CommandSpec::fixed("red gain reset", &[0x81, 0x01, 0x04, 0x03, 0x00, 0xff]),
    CommandSpec::fixed("blue gain up", &[0x81, 0x01, 0x04, 0x04, 0x02, 0xff]),
    CommandSpec::fixed("blue gain down", &[0x81, 0x01, 0x04, 0x04, 0x03, 0xff]),
    CommandSpec::fixed("blue gain reset", &[0x81, 0x01, 0x04, 0x04, 0x00, 0xff]),
    CommandSpec::encoded(
        "gain set",
        &[0x81, 0x01, 0x04, 0x4c, 0x00, 0x00, 0x00, 0x00, 0xff],
        Encoder::ExposureValue(&Gain::TABLE),
    ),
    CommandSpec::encoded(
        "shutter set",
        &[0x81, 0x01, 0x04, 0x4a, 0x00, 0x00, 0x00, 0x00, 0xff],
        Encoder::ExposureValue(&Shutter::TABLE),
    ),
    CommandSpec::encoded(
        "fstop set",
        &[0x81, 0x01, 0x04, 0x4b, 0x00, 0x00, 0x00, 0x00, 0xff],
        Encoder::ExposureValue(&FStop::TABLE),
    ),
    CommandSpec::encoded(
        "ex_ae_comp set",
        &[0x81, 0x01, 0x04, 0x4e, 0x00, 0x00, 0x00, 0x00, 0xff],
        Encoder::ExposureValue(&ExAeComp::TABLE),
    ),
    CommandSpec::fixed("ex ae comp on", &[0x81, 0x01, 0x04, 0x3e, 0x02, 0xff]),
    CommandSpec::fixed("ex ae comp off", &[0x81, 0x01, 0x04, 0x3e, 0x03, 0xff]),
];

/// Read-only catalog of [CommandSpec]s, keyed by name.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: &'static [CommandSpec],
    by_name: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    /// The built-in command table.
    pub fn standard() -> Self {
        Self::from_table(&STANDARD_COMMANDS)
    }

    fn from_table(commands: &'static [CommandSpec]) -> Self {
        let by_name: HashMap<_, _> = commands
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name, i))
            .collect();
        debug_assert_eq!(commands.len(), by_name.len(), "duplicate command names");
        Self { commands, by_name }
    }

    /// Looks up a command by name.
    ///
    /// ## Errors
    ///
    /// * [Error::UnknownCommand] when there is no such command
    pub fn lookup(&self, name: &str) -> Result<&'static CommandSpec> {
        self.by_name
            .get(name)
            .map(|&i| &self.commands[i])
            .ok_or_else(|| {
                error!("unknown command: {name:?}");
                Error::UnknownCommand(name.to_owned())
            })
    }

    /// Command names, in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.commands.iter().map(|c| c.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static CommandSpec> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Direction;
    use std::collections::HashSet;

    #[test]
    fn catalog() {
        let registry = CommandRegistry::standard();
        assert_eq!(STANDARD_COMMANDS.len(), registry.len());
        let names: HashSet<_> = registry.names().collect();
        assert_eq!(registry.len(), names.len());

        for spec in registry.iter() {
            assert_eq!(0x81, spec.template[0], "{}", spec.name);
            match spec.encoder {
                Some(Encoder::PanTiltRelative | Encoder::OneshotPtz) => {
                    assert_ne!(Some(&0xff), spec.template.last(), "{}", spec.name);
                }
                _ => assert_eq!(Some(&0xff), spec.template.last(), "{}", spec.name),
            }
        }
    }

    #[test]
    fn preset() -> Result<()> {
        let registry = CommandRegistry::standard();
        let set = registry.lookup("set preset x")?;
        assert_eq!(
            hex::decode("8101043f0107ff")?,
            set.get_command(&Argument::Index(7))?
        );
        // The shared template must not change between calls.
        assert_eq!(
            hex::decode("8101043f0100ff")?,
            set.get_command(&Argument::Index(0))?
        );
        assert_eq!(
            hex::decode("8101043f0203ff")?,
            registry
                .lookup("recall preset x")?
                .get_command(&Argument::Index(3))?
        );
        Ok(())
    }

    #[test]
    fn fixed_ignores_argument() -> Result<()> {
        let home = CommandRegistry::standard().lookup("home")?;
        assert_eq!(hex::decode("81010604ff")?, home.get_command(&Argument::None)?);
        assert_eq!(
            hex::decode("81010604ff")?,
            home.get_command(&Argument::Speed(0.5))?
        );
        assert_eq!(ArgumentKind::None, home.argument_kind());
        Ok(())
    }

    #[test]
    fn unknown() {
        let Err(Error::UnknownCommand(name)) = CommandRegistry::standard().lookup("unknown name")
        else {
            panic!("expected UnknownCommand");
        };
        assert_eq!("unknown name", name);
    }

    #[test]
    fn move_and_focus() -> Result<()> {
        let registry = CommandRegistry::standard();
        assert_eq!(
            hex::decode(concat!("81010601", "0101", "0102ff"))?,
            registry
                .lookup("move")?
                .get_command(&Argument::movement(Direction::DownLeft, 0.))?
        );
        assert_eq!(
            hex::decode("8101040834ff")?,
            registry
                .lookup("focus near var")?
                .get_command(&Argument::Speed(0.5))?
        );
        assert_eq!(
            hex::decode("8101040821ff")?,
            registry
                .lookup("focus far var")?
                .get_command(&Argument::Speed(0.))?
        );
        Ok(())
    }

    #[test]
    fn labels() -> Result<()> {
        let registry = CommandRegistry::standard();
        assert_eq!(Some(&AeMode::TABLE), registry.lookup("ae mode")?.labels());
        assert_eq!(Some(&FStop::TABLE), registry.lookup("fstop set")?.labels());
        assert_eq!(None, registry.lookup("move")?.labels());
        assert_eq!(
            ArgumentKind::ValueOrLabel,
            registry.lookup("shutter set")?.argument_kind()
        );
        assert_eq!(
            hex::decode("8101044a00000009ff")?,
            registry
                .lookup("shutter set")?
                .get_command(&Argument::label("1/125 | 1/120"))?
        );
        Ok(())
    }
}
