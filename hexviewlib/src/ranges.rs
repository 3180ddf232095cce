//! Colorized byte ranges and the per-level range manager.
//!
//! A [`ColoredRangeManager`] keeps a sorted, pairwise non-overlapping set of
//! [`ColoredRange`]s for one priority level. [`ColorLayers`] stacks ten
//! independent managers; the lowest level index wins when several levels
//! cover the same offset.

use crate::error::HexViewError;

/// Number of independent colorization priority levels.
pub const COLOR_LEVELS: usize = 10;

/// Plain RGB color, free of any GUI toolkit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Stock colors for callers that do not bring their own palette.
pub mod colors {
    use super::Color;

    pub const LIGHT_BLUE: Color = Color::from_rgb(33, 81, 109);
    pub const MUD: Color = Color::from_rgb(54, 44, 19);
    pub const GREEN: Color = Color::from_rgb(35, 53, 38);
    pub const RED: Color = Color::from_rgb(191, 32, 32);
    pub const GRAY_160: Color = Color::from_rgb(160, 160, 160);
    pub const GRAY_210: Color = Color::from_rgb(210, 210, 210);
}

/// A byte interval tagged with optional foreground/background colors.
///
/// Passing `None` for a color keeps the default theme color for that role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoredRange {
    start: u64,
    size: u64,
    foreground: Option<Color>,
    background: Option<Color>,
}

impl ColoredRange {
    #[must_use]
    pub const fn new(start: u64, size: u64, foreground: Option<Color>, background: Option<Color>) -> Self {
        Self {
            start,
            size,
            foreground,
            background,
        }
    }

    #[must_use]
    pub const fn start(&self) -> u64 {
        self.start
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// One past the last covered offset.
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.start + self.size
    }

    #[must_use]
    pub const fn foreground(&self) -> Option<Color> {
        self.foreground
    }

    #[must_use]
    pub const fn background(&self) -> Option<Color> {
        self.background
    }

    /// Check if the provided offset falls within `[start, start+size)`.
    #[must_use]
    pub const fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end()
    }
}

/// Sorted, non-overlapping set of colorized intervals for one priority level.
///
/// Overlap policy on insert: the new range always wins inside its own span.
/// Existing ranges that intersect it are truncated at the edges, removed when
/// fully covered, and split into two remainders when they strictly contain
/// the span being carved out.
#[derive(Debug, Default, Clone)]
pub struct ColoredRangeManager {
    /// Sorted by start, pairwise disjoint.
    ranges: Vec<ColoredRange>,
}

impl ColoredRangeManager {
    #[must_use]
    pub const fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Inserts `range`, trimming or removing whatever it overlaps.
    ///
    /// Zero-sized ranges are ignored.
    pub fn add_range(&mut self, range: ColoredRange) {
        if range.size == 0 {
            return;
        }
        self.carve(range.start, range.end());
        let idx = self.ranges.partition_point(|r| r.start < range.start);
        self.ranges.insert(idx, range);
    }

    /// Clears colorization for `[offset, offset+size)`.
    ///
    /// Partially overlapped ranges are truncated; a range strictly containing
    /// the span is split into a left and a right remainder.
    pub fn remove_range(&mut self, offset: u64, size: u64) {
        if size == 0 {
            return;
        }
        self.carve(offset, offset.saturating_add(size));
    }

    /// Returns the range containing `offset`, if any.
    #[must_use]
    pub fn find_range_with(&self, offset: u64) -> Option<&ColoredRange> {
        let idx = self.ranges.partition_point(|r| r.start <= offset);
        idx.checked_sub(1)
            .map(|i| &self.ranges[i])
            .filter(|r| r.contains_offset(offset))
    }

    /// Removes all ranges at this level.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    /// The current ranges, sorted by start offset.
    #[must_use]
    pub fn ranges(&self) -> &[ColoredRange] {
        &self.ranges
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Cuts `[start, end)` out of every stored range, keeping remainders.
    fn carve(&mut self, start: u64, end: u64) {
        let mut kept = Vec::with_capacity(self.ranges.len() + 1);
        for range in self.ranges.drain(..) {
            if range.end() <= start || range.start >= end {
                kept.push(range);
                continue;
            }
            if range.start < start {
                kept.push(ColoredRange {
                    size: start - range.start,
                    ..range
                });
            }
            if range.end() > end {
                kept.push(ColoredRange {
                    start: end,
                    size: range.end() - end,
                    ..range
                });
            }
        }
        self.ranges = kept;
    }
}

/// Fixed stack of [`COLOR_LEVELS`] independent range managers.
///
/// Cross-level lookup probes level 0 first; the first hit wins. Absence at
/// all levels means "no colorization, use the default theme".
#[derive(Debug, Default, Clone)]
pub struct ColorLayers {
    levels: [ColoredRangeManager; COLOR_LEVELS],
}

impl ColorLayers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            levels: [const { ColoredRangeManager::new() }; COLOR_LEVELS],
        }
    }

    /// Colorizes `[offset, offset+size)` at the given priority level.
    ///
    /// # Errors
    /// - [`HexViewError::InvalidLevel`] if `level` is outside `0..=9`.
    /// - [`HexViewError::OutOfRange`] if `size` is zero.
    pub fn colorize(
        &mut self,
        level: usize,
        offset: u64,
        size: u64,
        foreground: Option<Color>,
        background: Option<Color>,
    ) -> Result<(), HexViewError> {
        if size == 0 {
            return Err(HexViewError::OutOfRange { offset, limit: offset });
        }
        self.level_mut(level)?
            .add_range(ColoredRange::new(offset, size, foreground, background));
        Ok(())
    }

    /// Removes colorization for `[offset, offset+size)` at the given level.
    ///
    /// # Errors
    /// - [`HexViewError::InvalidLevel`] if `level` is outside `0..=9`.
    /// - [`HexViewError::OutOfRange`] if `size` is zero.
    pub fn uncolorize(&mut self, level: usize, offset: u64, size: u64) -> Result<(), HexViewError> {
        if size == 0 {
            return Err(HexViewError::OutOfRange { offset, limit: offset });
        }
        self.level_mut(level)?.remove_range(offset, size);
        Ok(())
    }

    /// Removes all ranges at one level.
    ///
    /// # Errors
    /// Returns [`HexViewError::InvalidLevel`] if `level` is outside `0..=9`.
    pub fn clear_level(&mut self, level: usize) -> Result<(), HexViewError> {
        self.level_mut(level)?.clear();
        Ok(())
    }

    /// Removes all ranges at every level.
    pub fn clear_all(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    /// Probes the levels in priority order and returns the first range
    /// containing `offset`.
    #[must_use]
    pub fn find_colored_range(&self, offset: u64) -> Option<&ColoredRange> {
        self.levels
            .iter()
            .find_map(|level| level.find_range_with(offset))
    }

    /// Borrows the manager for one level.
    ///
    /// # Errors
    /// Returns [`HexViewError::InvalidLevel`] if `level` is outside `0..=9`.
    pub fn level(&self, level: usize) -> Result<&ColoredRangeManager, HexViewError> {
        self.levels.get(level).ok_or(HexViewError::InvalidLevel(level))
    }

    fn level_mut(&mut self, level: usize) -> Result<&mut ColoredRangeManager, HexViewError> {
        self.levels
            .get_mut(level)
            .ok_or(HexViewError::InvalidLevel(level))
    }
}
