//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical instruction table and invokes a callback macro for code generation,
//! so the opcode enum, its decoding, and its parameter shapes all come from one
//! list.
//!
//! # Instruction format
//!
//! An instruction is one word for the opcode followed by one word per parameter.
//! The opcode word is `modes * 100 + opcode`; see [`decoder`](super::decoder)
//! for how the mode digits are unpacked.

use crate::virtual_machine::errors::VMError;

/// Largest parameter count of any instruction.
pub const MAX_PARAMS: usize = 3;

/// How an instruction uses one of its parameters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamKind {
    /// Read through addressing-mode resolution.
    In,
    /// Names a destination address; never dereferenced.
    Out,
}

/// Invokes a callback macro with the complete instruction definition list.
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            /// ADD a, b, dst ; dst = a + b
            Add = 1, "add" => [a: In, b: In, dst: Out],
            /// MUL a, b, dst ; dst = a * b
            Multiply = 2, "mul" => [a: In, b: In, dst: Out],
            /// IN dst ; dst = next input, suspends when none is queued
            Input = 3, "in" => [dst: Out],
            /// OUT a ; emit a
            Output = 4, "out" => [a: In],
            /// JNZ cond, target ; if cond != 0 then ip = target
            JumpIfTrue = 5, "jnz" => [cond: In, target: In],
            /// JZ cond, target ; if cond == 0 then ip = target
            JumpIfFalse = 6, "jz" => [cond: In, target: In],
            /// LT a, b, dst ; dst = (a < b)
            LessThan = 7, "lt" => [a: In, b: In, dst: Out],
            /// EQ a, b, dst ; dst = (a == b)
            Equal = 8, "eq" => [a: In, b: In, dst: Out],
            /// ARB delta ; relative_base += delta
            AdjustRelativeBase = 9, "arb" => [delta: In],
            /// HALT ; stop execution
            Halt = 99, "halt" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        pub enum Opcode {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl Opcode {
            /// Every opcode in table order.
            pub const ALL: &'static [Opcode] = &[ $( Opcode::$name, )* ];

            /// Decodes a bare opcode number (the low two digits of a word).
            ///
            /// `ip` is carried into the error for diagnostics.
            pub fn from_code(code: i64, ip: usize) -> Result<Self, VMError> {
                match code {
                    $( $opcode => Ok(Opcode::$name), )*
                    _ => Err(VMError::InvalidOpcode { opcode: code, ip }),
                }
            }

            /// Returns the numeric opcode.
            pub const fn code(&self) -> i64 {
                *self as i64
            }

            /// Returns the disassembly mnemonic for this opcode.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Opcode::$name => $mnemonic, )*
                }
            }

            /// Returns how each parameter is used, in order.
            pub const fn params(&self) -> &'static [ParamKind] {
                match self {
                    $( Opcode::$name => &[ $( ParamKind::$kind, )* ], )*
                }
            }

            /// Number of parameter words following the opcode word.
            pub const fn arity(&self) -> usize {
                self.params().len()
            }

            /// Total instruction length in words, opcode slot included.
            pub const fn width(&self) -> usize {
                self.arity() + 1
            }
        }
    };
}

for_each_instruction!(define_instructions);

impl TryFrom<i64> for Opcode {
    type Error = VMError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Opcode::from_code(value, 0)
    }
}
