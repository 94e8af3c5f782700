//! 3x5 glyphs for the 8x8 matrix modules.
//!
//! Each glyph is eight rows of three pixels; bit 2 is the leftmost column.
//! Digits sit on rows 1..=5 so the time is vertically centred.

pub const GLYPH_WIDTH: usize = 3;

pub const COLON: usize = 10;
pub const BLANK: usize = 11;

const fn glyph(rows: [u8; 5]) -> [u8; 8] {
    [0, rows[0], rows[1], rows[2], rows[3], rows[4], 0, 0]
}

pub const FONT: [[u8; 8]; 12] = [
    glyph([0b111, 0b101, 0b101, 0b101, 0b111]),
    glyph([0b010, 0b110, 0b010, 0b010, 0b111]),
    glyph([0b111, 0b001, 0b111, 0b100, 0b111]),
    glyph([0b111, 0b001, 0b111, 0b001, 0b111]),
    glyph([0b101, 0b101, 0b111, 0b001, 0b001]),
    glyph([0b111, 0b100, 0b111, 0b001, 0b111]),
    glyph([0b111, 0b100, 0b111, 0b101, 0b111]),
    glyph([0b111, 0b001, 0b001, 0b001, 0b001]),
    glyph([0b111, 0b101, 0b111, 0b101, 0b111]),
    glyph([0b111, 0b101, 0b111, 0b001, 0b111]),
    glyph([0b000, 0b010, 0b000, 0b010, 0b000]),
    glyph([0b000, 0b000, 0b000, 0b000, 0b000]),
];

/// Glyph index for an ASCII character; anything unknown is blank.
pub fn index(c: u8) -> usize {
    match c {
        b'0'..=b'9' => (c - b'0') as usize,
        b':' => COLON,
        _ => BLANK,
    }
}

pub fn lit(glyph: usize, row: usize, col: usize) -> bool {
    FONT[glyph][row] & (0b100 >> col) != 0
}
