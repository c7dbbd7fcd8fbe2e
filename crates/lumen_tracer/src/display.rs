//! Display sink interface for interactive rendering.

use std::ops::Range;

/// Something that shows the tone-mapped buffer while it converges.
pub trait DisplaySink {
    /// Called once before the first round.
    fn setup(&mut self, width: u32, height: u32);

    /// Called after every round.
    ///
    /// `buffer` is the whole tone-mapped image (RGB, bottom row first).
    /// Only rows in `changed_rows(last_row, row_count, height)` differ from
    /// the previous call.
    fn draw(&mut self, buffer: &[u8], width: u32, height: u32, last_row: i64, row_count: usize);
}

/// Rows `(last_row - row_count, last_row]` clipped to `[0, height)`.
pub fn changed_rows(last_row: i64, row_count: usize, height: u32) -> Range<u32> {
    let top = (last_row + 1).clamp(0, height as i64);
    let bottom = (last_row + 1 - row_count as i64).clamp(0, top);
    bottom as u32..top as u32
}

/// A sink that discards every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn setup(&mut self, _width: u32, _height: u32) {}

    fn draw(&mut self, _buffer: &[u8], _width: u32, _height: u32, _last_row: i64, _row_count: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_rows_full_band() {
        assert_eq!(changed_rows(9, 4, 10), 6..10);
    }

    #[test]
    fn test_changed_rows_clipped_at_bottom() {
        assert_eq!(changed_rows(1, 4, 10), 0..2);
        assert_eq!(changed_rows(0, 8, 10), 0..1);
    }

    #[test]
    fn test_changed_rows_out_of_range() {
        assert_eq!(changed_rows(-1, 4, 10), 0..0);
        assert_eq!(changed_rows(20, 4, 10), 10..10);
    }
}
