use crate::virtual_machine::errors::VMError;
use std::fmt;

/// Per-parameter addressing mode, taken from the opcode word's high digits.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// The parameter is an address; the operand is the word stored there.
    #[default]
    Position = 0,
    /// The parameter is the operand itself.
    Immediate = 1,
    /// The parameter is an offset from the relative base.
    Relative = 2,
}

impl Mode {
    /// Parses one mode digit. `param` (1-based) and `ip` only feed the error.
    pub fn from_digit(digit: i64, param: usize, ip: usize) -> Result<Self, VMError> {
        match digit {
            0 => Ok(Mode::Position),
            1 => Ok(Mode::Immediate),
            2 => Ok(Mode::Relative),
            _ => Err(VMError::InvalidAddressingMode {
                mode: digit,
                param,
                ip,
            }),
        }
    }

    /// Returns the short name used in disassembly.
    pub const fn tag(&self) -> &'static str {
        match self {
            Mode::Position => "pos",
            Mode::Immediate => "imm",
            Mode::Relative => "rel",
        }
    }
}

/// A raw parameter word together with the mode it is to be read in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Param {
    pub raw: i64,
    pub mode: Mode,
}

impl Param {
    pub const fn new(raw: i64, mode: Mode) -> Self {
        Self { raw, mode }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.mode.tag(), self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_valid_digits() {
        assert_eq!(Mode::from_digit(0, 1, 0).unwrap(), Mode::Position);
        assert_eq!(Mode::from_digit(1, 1, 0).unwrap(), Mode::Immediate);
        assert_eq!(Mode::from_digit(2, 1, 0).unwrap(), Mode::Relative);
    }

    #[test]
    fn mode_from_invalid_digits() {
        for digit in 3..=9 {
            let err = Mode::from_digit(digit, 2, 40).unwrap_err();
            assert_eq!(
                err,
                VMError::InvalidAddressingMode {
                    mode: digit,
                    param: 2,
                    ip: 40
                }
            );
        }
    }

    #[test]
    fn default_mode_is_position() {
        assert_eq!(Mode::default(), Mode::Position);
        assert_eq!(Param::default().mode, Mode::Position);
    }

    #[test]
    fn param_display() {
        assert_eq!(Param::new(5, Mode::Position).to_string(), "pos(5)");
        assert_eq!(Param::new(-3, Mode::Immediate).to_string(), "imm(-3)");
        assert_eq!(Param::new(10, Mode::Relative).to_string(), "rel(10)");
    }
}
