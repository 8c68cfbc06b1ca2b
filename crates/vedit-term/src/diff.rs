// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Each frame is compared against the previous one and only the cells that
// changed are written. A keystroke in the editor usually touches the cursor
// row and the status line, so most frames are a few dozen bytes.
//
// Per frame:
//
//   1. The view paints a FrameBuffer.
//   2. render() compares it row by row with the stored previous frame.
//   3. Changed cells go through the CellWriter into an OutputBuffer.
//   4. flush() hands the whole frame to the terminal in one write.
//
// The first frame and any frame of a different size clear the screen and
// draw every cell. The frame is wrapped in synchronized output (DEC 2026)
// and ends with SGR 0 so no style leaks past it.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What one render pass did. Logged at trace level by the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    pub cells_rendered: usize,
    pub cells_skipped: usize,
    pub bytes_written: usize,
}

impl RenderStats {
    #[inline]
    #[must_use]
    pub const fn total_cells(&self) -> usize {
        self.cells_rendered + self.cells_skipped
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Renders frames by writing only the cells that changed since the last one.
///
/// ```
/// use vedit_term::buffer::FrameBuffer;
/// use vedit_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(4, 2);
/// assert_eq!(renderer.render(&frame).cells_rendered, 8);
/// assert_eq!(renderer.render(&frame).cells_rendered, 0);
/// ```
#[derive(Debug, Default)]
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `current` against the previous frame and queue the output.
    /// Nothing reaches the terminal until [`flush`](Self::flush).
    pub fn render(&mut self, current: &FrameBuffer) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::begin_sync(&mut self.output).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        if previous.is_none() {
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let (Some(row), prev_row) = (current.row(y), previous.and_then(|p| p.row(y))) else {
                continue;
            };
            if prev_row == Some(row) {
                stats.cells_skipped += row.len();
                continue;
            }
            for (x, cell) in (0..width).zip(row) {
                let changed = prev_row.is_none_or(|prev| prev[usize::from(x)] != *cell);
                if changed {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();
        ansi::end_sync(&mut self.output).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// Bytes queued by the last render, for tests.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Append extra bytes after the frame, such as the cursor placement.
    pub fn queue(&mut self, bytes: &[u8]) {
        self.output.write_all(bytes).ok();
    }

    /// Write the queued frame to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush_stdout()
    }

    /// Write the queued frame to `w`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Forget the previous frame so the next render redraws everything.
    /// Used after a resize and for Ctrl-L.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev)
                if prev.width() == current.width() && prev.height() == current.height() =>
            {
                prev.copy_from(current);
            }
            _ => self.previous = Some(current.clone()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Cell, CellColor};

    fn render_frame(renderer: &mut DiffRenderer, frame: &FrameBuffer) -> (RenderStats, String) {
        let stats = renderer.render(frame);
        let output = String::from_utf8(renderer.output_bytes().to_vec()).unwrap();
        (stats, output)
    }

    // ── First render ────────────────────────────────────────────────────

    #[test]
    fn first_render_draws_everything() {
        let mut renderer = DiffRenderer::new();
        let (stats, output) = render_frame(&mut renderer, &FrameBuffer::new(10, 5));
        assert_eq!(stats.cells_rendered, 50);
        assert_eq!(stats.cells_skipped, 0);
        assert!(output.starts_with("\x1b[?2026h\x1b[2J"));
        assert!(output.ends_with("\x1b[0m\x1b[?2026l"));
    }

    // ── Steady state ────────────────────────────────────────────────────

    #[test]
    fn identical_frame_writes_only_the_envelope() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 0);
        assert_eq!(stats.cells_skipped, 50);
        assert_eq!(output, "\x1b[?2026h\x1b[0m\x1b[?2026l");
    }

    #[test]
    fn single_change_is_positioned() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);
        frame.set(7, 4, Cell::new('Z'));
        let (stats, output) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 1);
        assert_eq!(stats.cells_skipped, 49);
        assert!(output.contains("\x1b[5;8H"));
        assert!(output.contains('Z'));
    }

    #[test]
    fn changed_row_only_renders_its_cells() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(20, 4);
        renderer.render(&frame);
        frame.paint_text(0, 2, "hello", CellColor::Default, CellColor::Default, Attr::empty());
        let (stats, _) = render_frame(&mut renderer, &frame);
        assert_eq!(stats.cells_rendered, 5);
        assert_eq!(stats.total_cells(), 80);
    }

    #[test]
    fn reverting_a_cell_renders_it_again() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(3, 1);
        renderer.render(&frame);
        frame.set(0, 0, Cell::new('!'));
        assert_eq!(renderer.render(&frame).cells_rendered, 1);
        frame.set(0, 0, Cell::EMPTY);
        assert_eq!(renderer.render(&frame).cells_rendered, 1);
        assert_eq!(renderer.render(&frame).cells_rendered, 0);
    }

    #[test]
    fn styled_cell_emits_its_style() {
        let mut renderer = DiffRenderer::new();
        let mut frame = FrameBuffer::new(4, 1);
        renderer.render(&frame);
        frame.set(0, 0, Cell::styled('E', CellColor::RED, CellColor::Default, Attr::INVERSE));
        let (_, output) = render_frame(&mut renderer, &frame);
        assert!(output.contains("\x1b[7m\x1b[31m\x1b[49mE"));
    }

    // ── Redraws ─────────────────────────────────────────────────────────

    #[test]
    fn resize_redraws_everything() {
        let mut renderer = DiffRenderer::new();
        renderer.render(&FrameBuffer::new(10, 5));
        let (stats, output) = render_frame(&mut renderer, &FrameBuffer::new(20, 10));
        assert_eq!(stats.cells_rendered, 200);
        assert!(output.contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_redraws_everything() {
        let mut renderer = DiffRenderer::new();
        let frame = FrameBuffer::new(10, 5);
        renderer.render(&frame);
        renderer.force_redraw();
        assert_eq!(renderer.render(&frame).cells_rendered, 50);
    }

    #[test]
    fn zero_size_frame_writes_nothing() {
        let mut renderer = DiffRenderer::new();
        let stats = renderer.render(&FrameBuffer::new(0, 0));
        assert_eq!(stats, RenderStats::default());
    }

    // ── Output ──────────────────────────────────────────────────────────

    #[test]
    fn queued_bytes_follow_the_frame() {
        let mut renderer = DiffRenderer::new();
        renderer.render(&FrameBuffer::new(1, 1));
        renderer.queue(b"\x07");
        let mut sink = Vec::new();
        renderer.flush_to(&mut sink).unwrap();
        assert!(sink.ends_with(b"\x1b[?2026l\x07"));
        assert!(renderer.output_bytes().is_empty());
    }
}
