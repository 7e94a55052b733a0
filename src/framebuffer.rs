use std::fmt;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;
/// one bit per pixel, most significant bit leftmost
pub const SCREEN_PACKED_BYTES: usize = SCREEN_PIXELS / 8;

/// The 64x32 monochrome display, row-major. Pixels only ever change by
/// being XORed with sprite data, or all at once by a clear.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [bool; SCREEN_PIXELS],
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: [false; SCREEN_PIXELS],
        }
    }

    pub fn clear(&mut self) {
        self.pixels = [false; SCREEN_PIXELS];
    }

    /// coordinates wrap in both axes
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)]
    }

    pub fn pixels(&self) -> &[bool; SCREEN_PIXELS] {
        &self.pixels
    }

    /// XOR one 8-pixel sprite row onto the screen with its left edge at
    /// (x, y), wrapping round both edges. Returns true if any lit pixel was
    /// turned off.
    pub fn xor_row(&mut self, x: usize, y: usize, row: u8) -> bool {
        let mut collision = false;
        for col in 0..8 {
            if row & (0x80 >> col) == 0 {
                continue;
            }
            let px = &mut self.pixels[Self::index(x + col, y)];
            collision |= *px;
            *px ^= true;
        }
        collision
    }

    /// the screen packed to one bit per pixel, 8 pixels per byte, msb first
    pub fn to_packed(&self) -> [u8; SCREEN_PACKED_BYTES] {
        let mut packed = [0u8; SCREEN_PACKED_BYTES];
        for (i, lit) in self.pixels.iter().enumerate() {
            if *lit {
                packed[i / 8] |= 0x80 >> (i % 8);
            }
        }
        packed
    }

    fn index(x: usize, y: usize) -> usize {
        (x % SCREEN_WIDTH) + (y % SCREEN_HEIGHT) * SCREEN_WIDTH
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// '#' for lit, ' ' for dark, boxed in with '-' and '|'
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = "-".repeat(SCREEN_WIDTH + 2);
        writeln!(f, "{}", border)?;
        for row in self.pixels.chunks(SCREEN_WIDTH) {
            f.write_str("|")?;
            for lit in row {
                f.write_str(if *lit { "#" } else { " " })?;
            }
            f.write_str("|\n")?;
        }
        writeln!(f, "{}", border)
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.pixels.iter().filter(|p| **p).count();
        write!(f, "Framebuffer {{ lit: {} }}", lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_dark() {
        let fb = Framebuffer::new();
        assert!(fb.pixels().iter().all(|p| !p));
    }

    #[test]
    fn test_xor_row() {
        let mut fb = Framebuffer::new();
        let collision = fb.xor_row(8, 2, 0b10101011);
        assert!(!collision);
        let lit: Vec<bool> = (8..16).map(|x| fb.pixel(x, 2)).collect();
        assert_eq!(lit, [true, false, true, false, true, false, true, true]);
        assert!(!fb.pixel(7, 2));
        assert!(!fb.pixel(16, 2));
    }

    #[test]
    fn test_xor_row_collision() {
        let mut fb = Framebuffer::new();
        fb.xor_row(0, 0, 0b1000_0000);
        assert!(fb.xor_row(0, 0, 0b1100_0000));
        assert!(!fb.pixel(0, 0));
        assert!(fb.pixel(1, 0));
    }

    #[test]
    fn test_xor_row_no_collision_on_dark_overlap() {
        let mut fb = Framebuffer::new();
        fb.xor_row(0, 0, 0b0000_0001);
        // only the unset sprite bit overlaps the lit pixel
        assert!(!fb.xor_row(0, 0, 0b1111_1110));
    }

    #[test]
    fn test_xor_row_wraps_x() {
        let mut fb = Framebuffer::new();
        fb.xor_row(60, 0, 0xff);
        for x in 60..64 {
            assert!(fb.pixel(x, 0));
        }
        for x in 0..4 {
            assert!(fb.pixel(x, 0));
        }
        assert!(!fb.pixel(4, 0));
    }

    #[test]
    fn test_xor_row_wraps_y() {
        let mut fb = Framebuffer::new();
        fb.xor_row(0, 33, 0x80);
        assert!(fb.pixel(0, 1));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        fb.xor_row(3, 3, 0xff);
        fb.clear();
        assert_eq!(fb, Framebuffer::new());
    }

    #[test]
    fn test_packed() {
        let mut fb = Framebuffer::new();
        fb.xor_row(12, 8, 0xff);
        let packed = fb.to_packed();
        let start = (12 + 8 * SCREEN_WIDTH) / 8;
        assert_eq!(packed[start], 0b00001111);
        assert_eq!(packed[start + 1], 0b11110000);
        assert_eq!(packed.iter().filter(|b| **b != 0).count(), 2);
    }

    #[test]
    fn test_text_grid() {
        let mut fb = Framebuffer::new();
        fb.xor_row(0, 0, 0xc0);
        let text = fb.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), SCREEN_HEIGHT + 2);
        assert_eq!(lines[0], "-".repeat(66));
        assert!(lines[1].starts_with("|##  "));
        assert!(lines[1].ends_with(" |"));
        assert_eq!(lines[2], format!("|{}|", " ".repeat(64)));
        assert_eq!(lines[33], "-".repeat(66));
    }
}
