use std::io;
use thiserror::Error;

/// Everything that can go wrong loading or running a CHIP-8 program.
///
/// Unknown opcodes are deliberately absent: they are reported through the
/// interpreter's unhandled-opcode hook and execution carries on.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("stack overflow: call at {pc:#05X} with 16 frames already pushed")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("failed to read program: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = Chip8Error::ProgramTooLarge { size: 4000, max: 3584 };
        assert_eq!(
            e.to_string(),
            "program is too large (4000 bytes), max size is 3584 bytes"
        );
        let e = Chip8Error::StackUnderflow { pc: 0x200 };
        assert_eq!(
            e.to_string(),
            "stack underflow: return at 0x200 with an empty call stack"
        );
    }

    #[test]
    fn test_from_io() {
        let e: Chip8Error = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(e, Chip8Error::Io(_)));
    }
}
