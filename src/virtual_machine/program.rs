//! Program loading.
//!
//! A [`Program`] is the immutable initial memory image: a comma-separated list
//! of signed decimal integers with no header. It is reference counted so that
//! any number of machines can be booted from one parse.

use crate::virtual_machine::errors::VMError;
use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Immutable Intcode program image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    words: Arc<[i64]>,
}

impl Program {
    /// Wraps an already parsed word list.
    pub fn new(words: Vec<i64>) -> Self {
        Self {
            words: words.into(),
        }
    }

    /// Parses program text.
    ///
    /// Separators are commas; whitespace and newlines around words are ignored,
    /// as is a single trailing comma.
    pub fn parse(source: &str) -> Result<Self, VMError> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(Vec::new()));
        }
        let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);

        let words = trimmed
            .split(',')
            .enumerate()
            .map(|(index, token)| {
                let token = token.trim();
                token.parse::<i64>().map_err(|_| VMError::InvalidProgram {
                    index,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(words))
    }

    /// Reads and parses a program file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VMError> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// Returns the program words.
    pub fn words(&self) -> &[i64] {
        &self.words
    }
}

impl Deref for Program {
    type Target = [i64];

    fn deref(&self) -> &Self::Target {
        &self.words
    }
}

impl FromStr for Program {
    type Err = VMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

impl From<Vec<i64>> for Program {
    fn from(words: Vec<i64>) -> Self {
        Program::new(words)
    }
}

impl From<&[i64]> for Program {
    fn from(words: &[i64]) -> Self {
        Program::new(words.to_vec())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{word}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_comma_separated_words() {
        let program = Program::parse("1,0,0,3,99").unwrap();
        assert_eq!(program.words(), &[1, 0, 0, 3, 99]);
    }

    #[test]
    fn tolerates_whitespace_and_trailing_newline() {
        let program: Program = " 1, -2 ,\n3\n".parse().unwrap();
        assert_eq!(program.words(), &[1, -2, 3]);
    }

    #[test]
    fn tolerates_trailing_comma() {
        assert_eq!(Program::parse("4,5,").unwrap().words(), &[4, 5]);
    }

    #[test]
    fn empty_source_is_an_empty_program() {
        assert!(Program::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn large_literals_survive_parsing() {
        let program = Program::parse("104,1125899906842624,99").unwrap();
        assert_eq!(program[1], 1125899906842624);
    }

    #[test]
    fn rejects_non_integer_tokens() {
        assert_eq!(
            Program::parse("1,2,x,4"),
            Err(VMError::InvalidProgram {
                index: 2,
                token: "x".into()
            })
        );
        assert!(matches!(
            Program::parse("1,,2"),
            Err(VMError::InvalidProgram { index: 1, .. })
        ));
    }

    #[test]
    fn display_round_trips() {
        let source = "109,1,204,-1,99";
        assert_eq!(Program::parse(source).unwrap().to_string(), source);
    }

    #[test]
    fn clones_share_storage() {
        let a = Program::parse("1,2,3").unwrap();
        let b = a.clone();
        assert!(Arc::ptr_eq(&a.words, &b.words));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("program.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "1002,4,3,4,33").unwrap();

        let program = Program::from_file(&path).unwrap();
        assert_eq!(program.words(), &[1002, 4, 3, 4, 33]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let err = Program::from_file(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, VMError::Io(_)));
    }
}
