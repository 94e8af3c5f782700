use crate::clock::TimeOfDay;
use crate::config::DISPLAY_DEVICES;
use crate::font::{self, GLYPH_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Layer {
    /// Running time. Visible from start-up.
    Time,
    /// Edit buffer, drawn over [`Layer::Time`] while shown.
    Edit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub row: u8,
    pub column: u8,
}

impl Position {
    pub const fn new(row: u8, column: u8) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub visible: bool,
    pub blinking: bool,
}

impl Cursor {
    pub const BLINKING: Cursor = Cursor {
        visible: true,
        blinking: true,
    };
    pub const HIDDEN: Cursor = Cursor {
        visible: false,
        blinking: false,
    };
}

/// Character-cell display with independently shown layers.
pub trait DisplaySink {
    fn render_time(&mut self, at: Position, layer: Layer, time: TimeOfDay);
    fn set_cursor(&mut self, at: Position, layer: Layer, cursor: Cursor);
    fn show_layer(&mut self, layer: Layer);
    fn hide_layer(&mut self, layer: Layer);
}

/// First column covered by the matrix window.
pub const WINDOW_START: u8 = 9;
pub const CELLS: usize = 8;

pub type Frame = [[u8; 8]; DISPLAY_DEVICES];

#[derive(Debug, Clone, Copy)]
struct Plane {
    cells: [u8; CELLS],
    visible: bool,
    /// Cell index and whether it blinks.
    cursor: Option<(usize, bool)>,
}

impl Plane {
    const fn new(visible: bool) -> Self {
        Self {
            cells: [b' '; CELLS],
            visible,
            cursor: None,
        }
    }
}

fn cell(column: usize) -> Option<usize> {
    column
        .checked_sub(WINDOW_START as usize)
        .filter(|&i| i < CELLS)
}

/// Layered model of the chained MAX7219 matrix.
///
/// The matrix has a single line of [`CELLS`] characters covering columns
/// `WINDOW_START..WINDOW_START + CELLS`; anything outside is clipped. Rows
/// select nothing here: the topmost visible layer is what gets shown.
#[derive(Debug, Clone)]
pub struct Panel {
    time: Plane,
    edit: Plane,
    blink_on: bool,
}

impl Panel {
    pub const fn new() -> Self {
        Self {
            time: Plane::new(true),
            edit: Plane::new(false),
            blink_on: true,
        }
    }

    fn plane(&self, layer: Layer) -> &Plane {
        match layer {
            Layer::Time => &self.time,
            Layer::Edit => &self.edit,
        }
    }

    fn plane_mut(&mut self, layer: Layer) -> &mut Plane {
        match layer {
            Layer::Time => &mut self.time,
            Layer::Edit => &mut self.edit,
        }
    }

    fn top(&self) -> Option<&Plane> {
        [&self.edit, &self.time].into_iter().find(|p| p.visible)
    }

    pub fn text(&self, layer: Layer) -> &str {
        core::str::from_utf8(&self.plane(layer).cells).unwrap_or("")
    }

    pub fn is_visible(&self, layer: Layer) -> bool {
        self.plane(layer).visible
    }

    /// Column of the layer's cursor, if one is shown.
    pub fn cursor(&self, layer: Layer) -> Option<u8> {
        self.plane(layer)
            .cursor
            .map(|(cell, _)| WINDOW_START + cell as u8)
    }

    /// Characters currently lit, blink phase applied.
    pub fn cells(&self) -> [u8; CELLS] {
        let Some(top) = self.top() else {
            return [b' '; CELLS];
        };
        let mut cells = top.cells;
        if let Some((cell, true)) = top.cursor {
            if !self.blink_on {
                cells[cell] = b' ';
            }
        }
        cells
    }

    /// Flips the blink phase. Returns whether that changed what is shown.
    pub fn toggle_blink(&mut self) -> bool {
        self.blink_on = !self.blink_on;
        matches!(self.top(), Some(Plane { cursor: Some((_, true)), .. }))
    }

    /// Packs the topmost visible layer into per-device row bytes, glyphs
    /// three columns wide with one blank column between them, leftmost
    /// device first.
    pub fn frame(&self) -> Frame {
        let cells = self.cells();

        let mut fb_rows = [0u32; 8];
        let mut cursor = 0;

        for (i, &c) in cells.iter().enumerate() {
            let glyph = font::index(c);
            for (r, fb_row) in fb_rows.iter_mut().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if font::lit(glyph, r, col) {
                        *fb_row |= 1 << (31 - (cursor + col));
                    }
                }
            }
            cursor += GLYPH_WIDTH;
            if i < CELLS - 1 {
                cursor += 1;
            }
        }

        let mut device_buffers = [[0u8; 8]; DISPLAY_DEVICES];
        for (dev_idx, buffer) in device_buffers.iter_mut().enumerate() {
            let shift = 24 - (dev_idx * 8);
            for (r, row) in buffer.iter_mut().enumerate() {
                *row = ((fb_rows[r] >> shift) & 0xFF) as u8;
            }
        }

        device_buffers
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for Panel {
    fn render_time(&mut self, at: Position, layer: Layer, time: TimeOfDay) {
        let plane = self.plane_mut(layer);
        for (i, b) in time.to_text().bytes().enumerate() {
            if let Some(c) = cell(at.column as usize + i) {
                plane.cells[c] = b;
            }
        }
    }

    fn set_cursor(&mut self, at: Position, layer: Layer, cursor: Cursor) {
        let plane = self.plane_mut(layer);
        plane.cursor = match cell(at.column as usize) {
            Some(c) if cursor.visible => Some((c, cursor.blinking)),
            _ => None,
        };
        self.blink_on = true;
    }

    fn show_layer(&mut self, layer: Layer) {
        self.plane_mut(layer).visible = true;
    }

    fn hide_layer(&mut self, layer: Layer) {
        self.plane_mut(layer).visible = false;
    }
}
