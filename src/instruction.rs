use std::fmt;

/// A decoded 16-bit instruction word. Every field is extracted up front with
/// fixed masks; each handler picks the ones it needs.
///
/// ```text
///  F    X    Y    N
/// |----|----|----|----|
///      |--- nnn ------|
///           |-- kk ---|
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub word: u16,
}

impl Instruction {
    pub fn new(word: u16) -> Self {
        Instruction { word }
    }

    /// top nibble, selects the opcode family
    pub fn family(&self) -> usize {
        ((self.word & 0xf000) >> 12) as usize
    }

    /// first register selector, VX
    pub fn x(&self) -> usize {
        ((self.word & 0x0f00) >> 8) as usize
    }

    /// second register selector, VY
    pub fn y(&self) -> usize {
        ((self.word & 0x00f0) >> 4) as usize
    }

    /// trailing nibble; sprite height or ALU operation
    pub fn n(&self) -> u8 {
        (self.word & 0x000f) as u8
    }

    /// 8-bit immediate
    pub fn kk(&self) -> u8 {
        (self.word & 0x00ff) as u8
    }

    /// 12-bit address
    pub fn nnn(&self) -> u16 {
        self.word & 0x0fff
    }
}

impl From<u16> for Instruction {
    fn from(word: u16) -> Self {
        Instruction::new(word)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let i = Instruction::new(0xd4c3);
        assert_eq!(i.family(), 0xd);
        assert_eq!(i.x(), 0x4);
        assert_eq!(i.y(), 0xc);
        assert_eq!(i.n(), 0x3);
        assert_eq!(i.kk(), 0xc3);
        assert_eq!(i.nnn(), 0x4c3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::from(0x00e0).to_string(), "00E0");
    }
}
