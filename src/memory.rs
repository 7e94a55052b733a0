use crate::error::Chip8Error;
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// every address the interpreter computes is reduced with this
pub const CHIP8_ADDR_MASK: u16 = 0x0fff;

/// where the program is loaded
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// the biggest program that fits between 0x200 and the top of RAM
pub const CHIP8_MAX_PROGRAM_BYTES: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

/// where the hex digit sprites live
pub const CHIP8_FONT_ADDR: u16 = 0x000;

/// each font glyph is 8 pixels wide and this many rows tall
pub const CHIP8_FONT_GLYPH_BYTES: u16 = 5;

/// Represents a byte-addressed memory map where every address wraps at the
/// top of RAM, so nothing a program does can index out of bounds.
pub trait MemoryMap {
    /// the whole of memory, read only
    fn bytes(&self) -> &[u8];

    /// the whole of memory, writable
    fn bytes_mut(&mut self) -> &mut [u8];

    fn read_byte(&self, addr: u16) -> u8 {
        let bytes = self.bytes();
        bytes[addr as usize % bytes.len()]
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        let bytes = self.bytes_mut();
        let len = bytes.len();
        bytes[addr as usize % len] = value;
    }

    /// get a big-endian two-byte word; the second byte wraps round to 0x000
    fn get_word(&self, addr: u16) -> u16 {
        let hi = self.read_byte(addr) as u16;
        let lo = self.read_byte(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// write a chunk of bytes, wrapping at the top of memory
    fn write(&mut self, data: &[u8], addr: u16) {
        for (offset, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(offset as u16), *byte);
        }
    }
}

/// Defines the CHIP-8 memory map used here:
///   0x0000-0x004f  hex digit font
///   0x0050-0x01ff  reserved (zero)
///   0x0200-0x0fff  program
///
/// unlike the COSMAC VIP, the stack, variables and display buffer live
/// outside of addressable memory
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
}

impl MemoryMap for Chip8MemoryMap {
    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked in
    pub fn new() -> Self {
        let mut mm = Chip8MemoryMap {
            bytes: vec![0u8; CHIP8_RAM_SIZE_BYTES].into_boxed_slice(),
        };
        mm.reset();
        mm
    }

    /// zero everything, then put the font back
    pub fn reset(&mut self) {
        self.bytes.fill(0);
        self.write(&CHIP8_FONT, CHIP8_FONT_ADDR);
    }

    /// load a CHIP-8 program at 0x200; anything that doesn't fit is refused
    /// outright and memory is left as it was
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > CHIP8_MAX_PROGRAM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max: CHIP8_MAX_PROGRAM_BYTES,
            });
        }
        let start = CHIP8_PROGRAM_ADDR as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// read an unknown length of program from somewhere and load it
    pub fn load_program_from(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load_program(&buf)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

/// the conventional 4x5 hex digits, 0 through F
pub const CHIP8_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
