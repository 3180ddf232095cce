//! The `view` module provides [`HexView`], the logic core behind an
//! interactive hex viewer/editor widget.
//!
//! `HexView` owns the caret/selection state in nibble resolution, the active
//! sub-view (hex vs. text pane), base-address/address-mode metadata, the
//! colored-range layers, and the edit log. It orchestrates navigation, byte
//! edits, searches, and undo/redo against an externally supplied
//! [`ByteSource`], and reports state changes through a drainable event queue
//! so any front end can drive it without a toolkit dependency.
//!
//! All caret and selection math is performed in nibbles (half bytes) so that
//! half-byte edits in the hex pane are representable: a byte offset `o` maps
//! to nibble `2*o` (high) and `2*o + 1` (low).

use crate::editlog::{DataEdit, EditLog};
use crate::error::HexViewError;
use crate::ranges::{Color, ColorLayers, ColoredRange};
use crate::search;
use crate::source::ByteSource;

/// Signed caret/selection coordinate in half-byte units.
pub type NibblePosition = i64;

/// Byte values that terminate a word when double-click selecting in the text
/// pane, in addition to whitespace and non-printable bytes.
const WORD_DELIMITERS: &[u8] = b".,:;()?!-'/\"";

/// Which sub-view owns caret focus.
///
/// A single input advances the caret by 1 nibble in the hex pane and by a
/// full byte (2 nibbles) in the text pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    HexPane,
    TextPane,
}

/// Width of the rendered address column, from 8-bit up to 64-bit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    Bit8,
    Bit16,
    Bit24,
    #[default]
    Bit32,
    Bit40,
    Bit48,
    Bit56,
    Bit64,
}

impl AddressMode {
    /// Number of hex digits an address occupies in this mode.
    #[must_use]
    pub const fn digits(self) -> usize {
        match self {
            Self::Bit8 => 2,
            Self::Bit16 => 4,
            Self::Bit24 => 6,
            Self::Bit32 => 8,
            Self::Bit40 => 10,
            Self::Bit48 => 12,
            Self::Bit56 => 14,
            Self::Bit64 => 16,
        }
    }
}

/// Fire-and-forget notification emitted by [`HexView`] and drained by the
/// presentation layer via [`HexView::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexViewEvent {
    /// Selection or caret position changed; coordinates in nibbles.
    SelectionChanged { start: i64, length: i64 },
    /// Caret focus switched between the hex and text panes.
    ActiveViewChanged(ActiveView),
    /// The caret left the visible window; the presentation should scroll so
    /// the given nibble position becomes visible.
    ScrollRequest { nibble: i64 },
    /// Byte content changed (edit, undo, redo, or source replacement).
    DataChanged,
}

/// Result of an interactive edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The write went through and the caret advanced.
    Applied,
    /// The byte source reported "not yet available"; the edit was parked for
    /// [`HexView::retry_pending`] if the source asks callers to keep trying.
    Deferred,
}

/// Edit parked while the byte source is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingEdit {
    Nibble(u8),
    Byte(u8),
}

/// Logic core of a hex viewer/editor.
///
/// # Example
/// ```
/// use hexviewlib::{EditOutcome, HexView, MemorySource};
///
/// let mut view = HexView::new(MemorySource::new(vec![0x10, 0x20, 0x30, 0x40]));
///
/// // Typing "A" in the hex pane overwrites the high nibble of byte 0.
/// assert_eq!(view.apply_nibble_edit(0xA).unwrap(), EditOutcome::Applied);
/// assert_eq!(view.source().as_bytes()[0], 0xA0);
///
/// view.undo().unwrap();
/// assert_eq!(view.source().as_bytes()[0], 0x10);
/// ```
pub struct HexView<S: ByteSource> {
    source: S,
    /// Selection anchor in nibbles; the caret sits at `start + length`.
    selection_start: i64,
    /// Selection length in nibbles; negative means the selection extends
    /// backward from the anchor. Zero means "caret only, no selection".
    selection_length: i64,
    active_view: ActiveView,
    base_address: u64,
    address_mode: AddressMode,
    /// First byte the presentation currently shows.
    first_visible_byte: u64,
    /// Number of bytes the presentation currently shows.
    visible_bytes: u64,
    edits: EditLog,
    layers: ColorLayers,
    pending: Option<PendingEdit>,
    events: Vec<HexViewEvent>,
}

impl<S: ByteSource> HexView<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            selection_start: 0,
            selection_length: 0,
            active_view: ActiveView::HexPane,
            base_address: 0,
            address_mode: AddressMode::Bit32,
            first_visible_byte: 0,
            visible_bytes: u64::MAX,
            edits: EditLog::new(),
            layers: ColorLayers::new(),
            pending: None,
            events: Vec::new(),
        }
    }

    // -- Accessors

    /// Borrows the byte source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrows the byte source.
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Selection anchor and signed length, both in nibbles.
    #[must_use]
    pub const fn selection(&self) -> (i64, i64) {
        (self.selection_start, self.selection_length)
    }

    /// The nibble at the caret position.
    #[must_use]
    pub const fn current_nibble(&self) -> i64 {
        self.selection_start + self.selection_length
    }

    /// The display address at the caret position.
    #[must_use]
    pub fn current_offset(&self) -> u64 {
        self.base_address + self.caret_byte_offset()
    }

    #[must_use]
    pub const fn active_view(&self) -> ActiveView {
        self.active_view
    }

    #[must_use]
    pub const fn base_address(&self) -> u64 {
        self.base_address
    }

    pub const fn set_base_address(&mut self, base_address: u64) {
        self.base_address = base_address;
    }

    #[must_use]
    pub const fn address_mode(&self) -> AddressMode {
        self.address_mode
    }

    pub const fn set_address_mode(&mut self, mode: AddressMode) {
        self.address_mode = mode;
    }

    /// Tells the view which byte window the presentation currently shows, so
    /// it can decide when a caret move needs a scroll request.
    pub const fn set_visible_window(&mut self, first_byte: u64, visible_bytes: u64) {
        self.first_visible_byte = first_byte;
        self.visible_bytes = visible_bytes;
    }

    /// Drains the queued output events in emission order.
    pub fn take_events(&mut self) -> Vec<HexViewEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Navigation

    /// Moves the caret by `delta_nibbles`, clamped to `[0, 2*len]`.
    ///
    /// With `extend_selection` the selection grows or shrinks by the delta
    /// (same symmetric clamp); otherwise the selection collapses to zero
    /// length at the new caret position. Emits a scroll request when the
    /// caret leaves the visible window.
    pub fn move_caret(&mut self, delta_nibbles: i64, extend_selection: bool) {
        let limit = self.nibble_limit();
        let target = self.current_nibble().saturating_add(delta_nibbles);

        if extend_selection {
            if target < 0 {
                self.set_selection_length(-self.selection_start);
            } else if target < limit {
                self.set_selection_length(target - self.selection_start);
            } else {
                self.set_selection_length(limit - self.selection_start);
            }
        } else {
            self.set_selection_start(target.clamp(0, limit));
            self.set_selection_length(0);
        }

        let position = self.current_nibble();
        if !self.is_position_visible(position) {
            self.events.push(HexViewEvent::ScrollRequest { nibble: position });
        }
    }

    /// Places the caret at the given display address and collapses the
    /// selection.
    ///
    /// # Errors
    /// Returns [`HexViewError::OutOfRange`] if `offset` lies outside
    /// `[base_address, base_address + len]`.
    ///
    /// # Example
    /// ```
    /// use hexviewlib::{HexView, MemorySource};
    ///
    /// let mut view = HexView::new(MemorySource::new(vec![0; 16]));
    /// view.set_caret(4).unwrap();
    /// assert_eq!(view.current_nibble(), 8);
    /// assert!(view.set_caret(17).is_err());
    /// ```
    pub fn set_caret(&mut self, offset: u64) -> Result<(), HexViewError> {
        let limit = self.base_address.saturating_add(self.data_len());
        if offset < self.base_address || offset > limit {
            return Err(HexViewError::OutOfRange { offset, limit });
        }
        self.selection_length = 0;
        self.set_caret_nibble(to_nibble(offset - self.base_address));
        Ok(())
    }

    /// Scrolls to the given display address, placing the caret there.
    ///
    /// Unlike [`set_caret`](Self::set_caret) the address must point at an
    /// existing byte, and a caret already at the target only re-emits the
    /// scroll request.
    ///
    /// # Errors
    /// Returns [`HexViewError::OutOfRange`] if `offset` lies outside
    /// `[base_address, base_address + len)`.
    pub fn goto_offset(&mut self, offset: u64) -> Result<(), HexViewError> {
        if self.current_offset() == offset && self.selection_length == 0 {
            if !self.is_position_visible(self.selection_start) {
                self.events.push(HexViewEvent::ScrollRequest {
                    nibble: self.selection_start,
                });
            }
            return Ok(());
        }

        let limit = self.base_address.saturating_add(self.data_len());
        if offset < self.base_address || offset >= limit {
            return Err(HexViewError::OutOfRange { offset, limit });
        }
        self.selection_length = 0;
        self.set_caret_nibble(to_nibble(offset - self.base_address));
        Ok(())
    }

    /// Switches caret focus between the hex and text panes.
    ///
    /// The text pane cannot address half a byte, so leaving the hex pane
    /// forces the caret (and both selection ends) down to a byte boundary.
    pub fn toggle_view(&mut self) {
        if self.active_view == ActiveView::HexPane {
            let start = self.selection_start & !1;
            let length = self.selection_length - self.selection_length % 2;
            if start != self.selection_start || length != self.selection_length {
                self.selection_start = start;
                self.selection_length = length;
                self.emit_selection_changed();
            }
            self.active_view = ActiveView::TextPane;
        } else {
            self.active_view = ActiveView::HexPane;
        }
        self.events.push(HexViewEvent::ActiveViewChanged(self.active_view));
    }

    /// Selects a specific pane; a no-op when it already owns the caret.
    pub fn set_active_view(&mut self, view: ActiveView) {
        if view != self.active_view {
            self.toggle_view();
        }
    }

    /// Expands outward from `byte_offset` while adjacent bytes are printable
    /// and not delimiters, selecting the contiguous word. A delimiter or
    /// non-printable seed byte yields a zero-length selection at the seed.
    ///
    /// Only meaningful in the text pane; a no-op in the hex pane.
    ///
    /// # Errors
    /// Returns [`HexViewError::OutOfRange`] if `byte_offset` points past the
    /// end of the source.
    pub fn select_word(&mut self, byte_offset: u64) -> Result<(), HexViewError> {
        if self.active_view != ActiveView::TextPane {
            return Ok(());
        }
        let data_len = self.data_len();
        if byte_offset >= data_len {
            return Err(HexViewError::OutOfRange {
                offset: byte_offset,
                limit: data_len,
            });
        }
        let Some(seed) = self.source.read_byte(byte_offset) else {
            return Ok(());
        };
        if !is_word_byte(seed) {
            self.selection_length = 0;
            self.set_caret_nibble(to_nibble(byte_offset));
            return Ok(());
        }

        let mut word_start = byte_offset;
        while word_start > 0 {
            match self.source.read_byte(word_start - 1) {
                Some(byte) if is_word_byte(byte) => word_start -= 1,
                _ => break,
            }
        }
        let mut word_end = byte_offset;
        while word_end + 1 < data_len {
            match self.source.read_byte(word_end + 1) {
                Some(byte) if is_word_byte(byte) => word_end += 1,
                _ => break,
            }
        }

        self.selection_start = to_nibble(word_start);
        self.selection_length = to_nibble(word_end - word_start + 1);
        self.emit_selection_changed();
        Ok(())
    }

    /// Selects the entire byte source.
    pub fn select_all(&mut self) {
        self.selection_start = 0;
        self.selection_length = self.nibble_limit();
        self.emit_selection_changed();
    }

    /// Whether the byte at the given display address is inside the current
    /// selection. Forward and backward selections are handled symmetrically
    /// against the half-open nibble range.
    #[must_use]
    pub fn is_selected_offset(&self, offset: u64) -> bool {
        let Some(relative) = offset.checked_sub(self.base_address) else {
            return false;
        };
        let Ok(relative) = i64::try_from(relative) else {
            return false;
        };
        let start = self.selection_start;
        let length = self.selection_length;
        if length == 0 {
            false
        } else if length > 0 {
            relative >= start / 2 && relative.saturating_mul(2) < start + length
        } else {
            relative >= (start + length) / 2 && relative.saturating_mul(2) < start
        }
    }

    // -- Editing

    /// Overwrites one nibble of the byte under the caret, merging with the
    /// existing byte by caret parity, then advances the caret one nibble.
    ///
    /// An unavailable byte source defers the edit instead of failing; see
    /// [`EditOutcome::Deferred`] and [`retry_pending`](Self::retry_pending).
    ///
    /// # Errors
    /// - [`HexViewError::OutOfRange`] if `nibble_value` exceeds `0xF` or the
    ///   caret sits at/past the end of the data.
    /// - [`HexViewError::NotEditable`] if the source is read-only.
    pub fn apply_nibble_edit(&mut self, nibble_value: u8) -> Result<EditOutcome, HexViewError> {
        if nibble_value > 0x0F {
            return Err(HexViewError::OutOfRange {
                offset: u64::from(nibble_value),
                limit: 0x0F,
            });
        }
        let caret = self.current_nibble();
        self.check_editable(caret)?;

        let offset = self.caret_byte_offset();
        let Some(old_value) = self.source.read_byte(offset) else {
            return Ok(self.defer(PendingEdit::Nibble(nibble_value)));
        };
        let new_value = if caret % 2 == 0 {
            (old_value & 0x0F) | (nibble_value << 4)
        } else {
            (old_value & 0xF0) | nibble_value
        };
        self.commit_write(offset, old_value, new_value, 1)?;
        Ok(EditOutcome::Applied)
    }

    /// Overwrites the whole byte under the caret, then advances the caret by
    /// one byte.
    ///
    /// # Errors
    /// Same failure modes as [`apply_nibble_edit`](Self::apply_nibble_edit).
    pub fn apply_byte_edit(&mut self, byte_value: u8) -> Result<EditOutcome, HexViewError> {
        let caret = self.current_nibble();
        self.check_editable(caret)?;

        let offset = self.caret_byte_offset();
        let Some(old_value) = self.source.read_byte(offset) else {
            return Ok(self.defer(PendingEdit::Byte(byte_value)));
        };
        self.commit_write(offset, old_value, byte_value, 2)?;
        Ok(EditOutcome::Applied)
    }

    /// Whether an edit is parked waiting for the byte source to become
    /// available. Interactive edits should stay disabled while this holds.
    #[must_use]
    pub const fn is_waiting_for_data(&self) -> bool {
        self.pending.is_some()
    }

    /// Re-attempts the parked edit, if any. The retry cadence is the
    /// presentation layer's policy; the view never busy-waits.
    ///
    /// # Errors
    /// Same failure modes as the original edit request.
    pub fn retry_pending(&mut self) -> Result<EditOutcome, HexViewError> {
        match self.pending.take() {
            None => Ok(EditOutcome::Applied),
            Some(PendingEdit::Nibble(value)) => self.apply_nibble_edit(value),
            Some(PendingEdit::Byte(value)) => self.apply_byte_edit(value),
        }
    }

    /// Entry point for change notifications from the byte source.
    ///
    /// Re-validates the caret against the current data length (the source
    /// may have been resized underneath the view), collapses any pending
    /// wait state, and forwards the notification to the event queue.
    pub fn data_changed(&mut self) {
        let limit = self.nibble_limit();
        if self.selection_start > limit {
            self.selection_length = 0;
            self.set_caret_nibble(limit);
        } else if self.current_nibble() > limit {
            self.set_selection_length(limit - self.selection_start);
        }
        self.pending = None;
        self.events.push(HexViewEvent::DataChanged);
    }

    /// Replaces the byte source, returning the old one. Caret, selection,
    /// edit log, and modification counters are reset.
    pub fn set_source(&mut self, source: S) -> S {
        let old = std::mem::replace(&mut self.source, source);
        self.edits.reset();
        self.pending = None;
        self.selection_length = 0;
        self.set_caret_nibble(0);
        self.events.push(HexViewEvent::DataChanged);
        old
    }

    // -- Undo/redo

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.edits.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.edits.can_redo()
    }

    /// Reverts the most recent edit: restores the old byte value, decrements
    /// the modification counter, restores the pane the edit was made in, and
    /// places the caret at the edited offset.
    ///
    /// # Errors
    /// Returns [`HexViewError::CannotUndo`] if the log is empty or the byte
    /// source can no longer be written; the stacks are left untouched.
    pub fn undo(&mut self) -> Result<(), HexViewError> {
        if !self.edits.can_undo() || !self.source.is_writable() {
            return Err(HexViewError::CannotUndo);
        }
        let Some(edit) = self.edits.undo_edit() else {
            return Err(HexViewError::CannotUndo);
        };
        if !self.source.write(edit.offset(), &[edit.old_value()]) {
            self.edits.redo_edit();
            return Err(HexViewError::CannotUndo);
        }
        self.edits.clear_modified(edit.offset(), false);
        self.set_active_view(edit.view());
        self.selection_length = 0;
        self.set_caret_nibble(to_nibble(edit.offset()));
        self.events.push(HexViewEvent::DataChanged);
        Ok(())
    }

    /// Re-applies the most recently undone edit: writes the new byte value
    /// back, increments the modification counter, and places the caret one
    /// byte past the edited offset.
    ///
    /// # Errors
    /// Returns [`HexViewError::CannotRedo`] if the log is empty or the byte
    /// source can no longer be written; the stacks are left untouched.
    pub fn redo(&mut self) -> Result<(), HexViewError> {
        if !self.edits.can_redo() || !self.source.is_writable() {
            return Err(HexViewError::CannotRedo);
        }
        let Some(edit) = self.edits.redo_edit() else {
            return Err(HexViewError::CannotRedo);
        };
        if !self.source.write(edit.offset(), &[edit.new_value()]) {
            self.edits.undo_edit();
            return Err(HexViewError::CannotRedo);
        }
        self.edits.set_modified(edit.offset());
        self.set_active_view(edit.view());
        self.selection_length = 0;
        self.set_caret_nibble(to_nibble(edit.offset() + 1));
        self.events.push(HexViewEvent::DataChanged);
        Ok(())
    }

    /// Drops all undo/redo history and modification counters without
    /// touching the byte source.
    pub fn reset_undo(&mut self) {
        self.edits.reset();
    }

    // -- Modification tracking

    /// Whether the byte at the source-relative offset has outstanding
    /// modifications.
    #[must_use]
    pub fn is_modified(&self, offset: u64) -> bool {
        self.edits.is_modified(offset)
    }

    /// Whether any byte has outstanding modifications.
    #[must_use]
    pub fn is_any_modified(&self) -> bool {
        self.edits.any_modified()
    }

    /// Outstanding modification count for the source-relative offset.
    #[must_use]
    pub fn modified_count(&self, offset: u64) -> u32 {
        self.edits.modified_count(offset)
    }

    /// Iterates over the modified source-relative offsets in ascending
    /// order, for presentation highlighting.
    pub fn modified_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.edits.modified_offsets()
    }

    /// Forcibly clears every modification counter.
    pub fn clear_modified(&mut self) {
        self.edits.clear_all_modified();
    }

    // -- Colorization

    /// Colorizes `[offset, offset+size)` at the given priority level; level
    /// 0 has the highest priority during lookup.
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
        self.layers.colorize(level, offset, size, foreground, background)
    }

    /// Removes colorization for `[offset, offset+size)` at the given level.
    ///
    /// # Errors
    /// Same failure modes as [`colorize`](Self::colorize).
    pub fn uncolorize(&mut self, level: usize, offset: u64, size: u64) -> Result<(), HexViewError> {
        self.layers.uncolorize(level, offset, size)
    }

    /// Removes all ranges at one level.
    ///
    /// # Errors
    /// Returns [`HexViewError::InvalidLevel`] if `level` is outside `0..=9`.
    pub fn uncolorize_level(&mut self, level: usize) -> Result<(), HexViewError> {
        self.layers.clear_level(level)
    }

    /// Removes all ranges at every level.
    pub fn uncolorize_all(&mut self) {
        self.layers.clear_all();
    }

    /// First colored range covering `offset`, probing levels in priority
    /// order. `None` means "use the default theme".
    #[must_use]
    pub fn find_colored_range(&self, offset: u64) -> Option<&ColoredRange> {
        self.layers.find_colored_range(offset)
    }

    /// Borrows the colored-range layers for presentation queries.
    #[must_use]
    pub const fn layers(&self) -> &ColorLayers {
        &self.layers
    }

    // -- Search

    /// First occurrence of the byte pattern at or after `start_offset`.
    #[must_use]
    pub fn find_bytes(&self, start_offset: u64, pattern: &[u8]) -> Option<u64> {
        let span = self.data_len().saturating_sub(start_offset);
        search::find_index_of(&self.source, start_offset, span, pattern, true)
    }

    /// First occurrence of the text pattern at or after `start_offset`.
    ///
    /// The keyword is converted to raw bytes with a fixed single-byte
    /// encoding (code points truncated to 8 bits) before delegating to the
    /// byte search.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn find_text(&self, start_offset: u64, keyword: &str, case_sensitive: bool) -> Option<u64> {
        let pattern: Vec<u8> = keyword.chars().map(|c| c as u8).collect();
        let span = self.data_len().saturating_sub(start_offset);
        search::find_index_of(&self.source, start_offset, span, &pattern, case_sensitive)
    }

    /// First regex match at or after `start_offset`. Invalid patterns yield
    /// no match.
    #[must_use]
    pub fn find_regex(&self, start_offset: u64, pattern: &str) -> Option<u64> {
        search::find_regex(&self.source, start_offset, pattern)
    }

    // -- Internals

    fn data_len(&self) -> u64 {
        self.source.len()
    }

    /// One past the last addressable nibble: `2 * data_len`.
    fn nibble_limit(&self) -> i64 {
        i64::try_from(self.data_len().saturating_mul(2)).unwrap_or(i64::MAX)
    }

    /// Source-relative byte offset under the caret.
    #[allow(clippy::cast_sign_loss)]
    fn caret_byte_offset(&self) -> u64 {
        // The caret never goes negative; see the selection invariant.
        (self.current_nibble() / 2) as u64
    }

    fn is_position_visible(&self, nibble: i64) -> bool {
        let first = self.first_visible_byte.saturating_mul(2);
        let last = self
            .first_visible_byte
            .saturating_add(self.visible_bytes)
            .saturating_mul(2);
        let first = i64::try_from(first).unwrap_or(i64::MAX);
        let last = i64::try_from(last).unwrap_or(i64::MAX);
        nibble >= first && nibble <= last
    }

    fn emit_selection_changed(&mut self) {
        self.events.push(HexViewEvent::SelectionChanged {
            start: self.selection_start,
            length: self.selection_length,
        });
    }

    fn set_selection_start(&mut self, start: i64) {
        if start != self.selection_start {
            self.selection_start = start;
            self.emit_selection_changed();
        }
    }

    fn set_selection_length(&mut self, length: i64) {
        if length != self.selection_length {
            self.selection_length = length;
            self.emit_selection_changed();
        }
    }

    /// Moves the caret without firing per-field notifications, then emits a
    /// single selection-changed event plus a scroll request if needed.
    fn set_caret_nibble(&mut self, nibble: i64) {
        self.selection_start = nibble;
        if !self.is_position_visible(nibble) {
            self.events.push(HexViewEvent::ScrollRequest { nibble });
        }
        self.emit_selection_changed();
    }

    fn check_editable(&self, caret: i64) -> Result<(), HexViewError> {
        if caret >= self.nibble_limit() {
            return Err(HexViewError::OutOfRange {
                offset: self.current_offset(),
                limit: self.base_address.saturating_add(self.data_len()),
            });
        }
        if !self.source.is_writable() {
            return Err(HexViewError::NotEditable);
        }
        Ok(())
    }

    fn defer(&mut self, pending: PendingEdit) -> EditOutcome {
        if self.source.keep_trying() {
            self.pending = Some(pending);
        }
        EditOutcome::Deferred
    }

    fn commit_write(
        &mut self,
        offset: u64,
        old_value: u8,
        new_value: u8,
        advance_nibbles: i64,
    ) -> Result<(), HexViewError> {
        if !self.source.write(offset, &[new_value]) {
            return Err(HexViewError::NotEditable);
        }
        self.edits.set_modified(offset);
        self.edits
            .commit(DataEdit::new(offset, old_value, new_value, self.active_view));
        self.pending = None;
        self.events.push(HexViewEvent::DataChanged);
        self.move_caret(advance_nibbles, false);
        Ok(())
    }
}

fn to_nibble(offset: u64) -> i64 {
    i64::try_from(offset.saturating_mul(2)).unwrap_or(i64::MAX)
}

fn is_word_byte(byte: u8) -> bool {
    search::is_printable_byte(byte)
        && !byte.is_ascii_whitespace()
        && !WORD_DELIMITERS.contains(&byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn view_over(bytes: Vec<u8>) -> HexView<MemorySource> {
        HexView::new(MemorySource::new(bytes))
    }

    #[test]
    fn test_move_caret_clamps_to_bounds() {
        // Arrange
        let mut view = view_over(vec![0; 4]);

        // Act / Assert - huge deltas in both directions stay inside [0, 8]
        view.move_caret(i64::MAX, false);
        assert_eq!(view.current_nibble(), 8);
        view.move_caret(i64::MIN, false);
        assert_eq!(view.current_nibble(), 0);
        view.move_caret(-3, false);
        assert_eq!(view.current_nibble(), 0);
        view.move_caret(5, false);
        assert_eq!(view.current_nibble(), 5);
    }

    #[test]
    fn test_extend_selection_symmetric_clamp() {
        // Arrange
        let mut view = view_over(vec![0; 4]);
        view.move_caret(4, false);

        // Act - extend far past both ends
        view.move_caret(100, true);
        assert_eq!(view.selection(), (4, 4));
        view.move_caret(-100, true);

        // Assert - length clamped so the caret lands on 0
        assert_eq!(view.selection(), (4, -4));
        assert_eq!(view.current_nibble(), 0);
    }

    #[test]
    fn test_backward_selection_covers_same_bytes() {
        // Arrange - forward selection over bytes 1..3
        let mut view = view_over(vec![0; 8]);
        view.move_caret(2, false);
        view.move_caret(4, true);
        let forward: Vec<bool> = (0..8).map(|o| view.is_selected_offset(o)).collect();

        // Act - backward selection over the same span (caret is at nibble 6)
        view.move_caret(0, false);
        view.move_caret(-4, true);
        let backward: Vec<bool> = (0..8).map(|o| view.is_selected_offset(o)).collect();

        // Assert - symmetry law
        assert_eq!(forward, backward);
        assert!(view.is_selected_offset(1));
        assert!(view.is_selected_offset(2));
        assert!(!view.is_selected_offset(3));
    }

    #[test]
    fn test_no_selection_when_length_zero() {
        // Arrange
        let mut view = view_over(vec![0; 4]);
        view.move_caret(2, false);

        // Act / Assert
        assert!(!view.is_selected_offset(1));
        assert!(!view.is_selected_offset(0));
    }

    #[test]
    fn test_selection_respects_base_address() {
        // Arrange
        let mut view = view_over(vec![0; 8]);
        view.set_base_address(0x1000);
        view.move_caret(2, false);
        view.move_caret(4, true);

        // Act / Assert - containment works on display addresses
        assert!(view.is_selected_offset(0x1001));
        assert!(!view.is_selected_offset(1));
        assert!(!view.is_selected_offset(0x1003));
    }

    #[test]
    fn test_set_caret_bounds() {
        // Arrange
        let mut view = view_over(vec![0; 4]);
        view.set_base_address(0x100);

        // Act / Assert - one past the last byte is a valid caret slot
        assert!(view.set_caret(0x104).is_ok());
        assert_eq!(view.current_nibble(), 8);
        assert_eq!(
            view.set_caret(0x105),
            Err(HexViewError::OutOfRange {
                offset: 0x105,
                limit: 0x104
            })
        );
        assert_eq!(
            view.set_caret(0xFF),
            Err(HexViewError::OutOfRange {
                offset: 0xFF,
                limit: 0x104
            })
        );
    }

    #[test]
    fn test_toggle_view_rounds_to_byte_boundary() {
        // Arrange
        let mut view = view_over(vec![0; 4]);
        view.move_caret(3, false);

        // Act
        view.toggle_view();

        // Assert
        assert_eq!(view.active_view(), ActiveView::TextPane);
        assert_eq!(view.current_nibble(), 2);

        // Act - toggling back does not move the caret
        view.toggle_view();
        assert_eq!(view.active_view(), ActiveView::HexPane);
        assert_eq!(view.current_nibble(), 2);
    }

    #[test]
    fn test_nibble_edit_merges_high_and_low() {
        // Arrange
        let mut view = view_over(vec![0x10, 0x20]);

        // Act - high nibble of byte 0, then low nibble of byte 0
        view.apply_nibble_edit(0xA).unwrap();
        view.apply_nibble_edit(0xB).unwrap();

        // Assert
        assert_eq!(view.source().as_bytes()[0], 0xAB);
        assert_eq!(view.current_nibble(), 2);
        assert_eq!(view.modified_count(0), 2);
    }

    #[test]
    fn test_byte_edit_advances_full_byte() {
        // Arrange
        let mut view = view_over(vec![0x10, 0x20]);
        view.toggle_view();

        // Act
        view.apply_byte_edit(b'x').unwrap();

        // Assert
        assert_eq!(view.source().as_bytes()[0], b'x');
        assert_eq!(view.current_nibble(), 2);
    }

    #[test]
    fn test_edit_rejected_at_end_of_data() {
        // Arrange
        let mut view = view_over(vec![0x10]);
        view.move_caret(2, false);

        // Act
        let res = view.apply_nibble_edit(0xF);

        // Assert
        assert!(matches!(res, Err(HexViewError::OutOfRange { .. })));
        assert_eq!(view.source().as_bytes(), &[0x10]);
    }

    #[test]
    fn test_edit_rejected_when_read_only() {
        // Arrange
        let mut view = HexView::new(MemorySource::read_only(vec![0x10]));

        // Act
        let res = view.apply_nibble_edit(0xF);

        // Assert
        assert_eq!(res, Err(HexViewError::NotEditable));
        assert!(!view.can_undo());
    }

    #[test]
    fn test_invalid_nibble_value_rejected() {
        // Arrange
        let mut view = view_over(vec![0x10]);

        // Act
        let res = view.apply_nibble_edit(0x10);

        // Assert
        assert!(matches!(res, Err(HexViewError::OutOfRange { .. })));
    }

    #[test]
    fn test_undo_restores_byte_and_counter() {
        // Arrange - length-4 source, caret at nibble 0
        let mut view = view_over(vec![0x10, 0x20, 0x30, 0x40]);
        view.apply_nibble_edit(0xA).unwrap();
        assert_eq!(view.source().as_bytes()[0], 0xA0);
        assert_eq!(view.modified_count(0), 1);
        assert_eq!(view.current_nibble(), 1);

        // Act
        view.undo().unwrap();

        // Assert
        assert_eq!(view.source().as_bytes()[0], 0x10);
        assert_eq!(view.modified_count(0), 0);
        assert_eq!(view.current_nibble(), 0);
    }

    #[test]
    fn test_redo_round_trip() {
        // Arrange
        let mut view = view_over(vec![0x10, 0x20]);
        view.apply_nibble_edit(0xA).unwrap();
        view.undo().unwrap();

        // Act
        view.redo().unwrap();

        // Assert - observationally identical to the original commit
        assert_eq!(view.source().as_bytes()[0], 0xA0);
        assert_eq!(view.modified_count(0), 1);
        assert_eq!(view.current_nibble(), 2);
        assert!(view.can_undo());
        assert!(!view.can_redo());
    }

    #[test]
    fn test_commit_after_undo_discards_redo() {
        // Arrange
        let mut view = view_over(vec![0x10, 0x20]);
        view.apply_nibble_edit(0xA).unwrap();
        view.undo().unwrap();

        // Act - a fresh edit branches history
        view.apply_nibble_edit(0xB).unwrap();

        // Assert
        assert_eq!(view.redo(), Err(HexViewError::CannotRedo));
    }

    #[test]
    fn test_undo_empty_log_fails() {
        // Arrange
        let mut view = view_over(vec![0x10]);

        // Act / Assert
        assert_eq!(view.undo(), Err(HexViewError::CannotUndo));
        assert_eq!(view.redo(), Err(HexViewError::CannotRedo));
    }

    #[test]
    fn test_undo_fails_when_source_became_read_only() {
        // Arrange
        let mut view = view_over(vec![0x10]);
        view.apply_nibble_edit(0xA).unwrap();
        view.source_mut().set_writable(false);

        // Act
        let res = view.undo();

        // Assert - stacks unaffected
        assert_eq!(res, Err(HexViewError::CannotUndo));
        assert!(view.can_undo());
        assert_eq!(view.source().as_bytes()[0], 0xA0);
    }

    #[test]
    fn test_undo_restores_originating_view() {
        // Arrange - edit made in the text pane, undone from the hex pane
        let mut view = view_over(vec![0x10, 0x20]);
        view.toggle_view();
        view.apply_byte_edit(b'z').unwrap();
        view.set_active_view(ActiveView::HexPane);

        // Act
        view.undo().unwrap();

        // Assert
        assert_eq!(view.active_view(), ActiveView::TextPane);
        assert_eq!(view.source().as_bytes()[0], 0x10);
    }

    #[test]
    fn test_select_word_expands_over_printables() {
        // Arrange
        let mut view = view_over(b"one two,three".to_vec());
        view.toggle_view();

        // Act - seed inside "two"
        view.select_word(5).unwrap();

        // Assert - "two" spans bytes 4..=6
        assert_eq!(view.selection(), (8, 6));
        assert!(view.is_selected_offset(4));
        assert!(view.is_selected_offset(6));
        assert!(!view.is_selected_offset(7));
    }

    #[test]
    fn test_select_word_reaches_data_edges() {
        // Arrange
        let mut view = view_over(b"word".to_vec());
        view.toggle_view();

        // Act
        view.select_word(2).unwrap();

        // Assert - expands to both ends of the source
        assert_eq!(view.selection(), (0, 8));
    }

    #[test]
    fn test_select_word_on_delimiter_collapses() {
        // Arrange
        let mut view = view_over(b"a,b".to_vec());
        view.toggle_view();

        // Act - seed on the comma
        view.select_word(1).unwrap();

        // Assert - zero-length selection at the seed
        assert_eq!(view.selection(), (2, 0));
    }

    #[test]
    fn test_select_word_noop_in_hex_pane() {
        // Arrange
        let mut view = view_over(b"word".to_vec());

        // Act
        view.select_word(2).unwrap();

        // Assert
        assert_eq!(view.selection(), (0, 0));
    }

    #[test]
    fn test_select_all() {
        // Arrange
        let mut view = view_over(vec![0; 5]);

        // Act
        view.select_all();

        // Assert
        assert_eq!(view.selection(), (0, 10));
        assert!(view.is_selected_offset(0));
        assert!(view.is_selected_offset(4));
    }

    #[test]
    fn test_scroll_request_when_caret_leaves_window() {
        // Arrange - window shows bytes 0..16
        let mut view = view_over(vec![0; 64]);
        view.set_visible_window(0, 16);
        view.take_events();

        // Act
        view.move_caret(40, false);

        // Assert
        let events = view.take_events();
        assert!(events.contains(&HexViewEvent::ScrollRequest { nibble: 40 }));

        // Act - moves inside the window stay quiet
        view.set_visible_window(16, 16);
        view.move_caret(2, false);
        let events = view.take_events();
        assert!(!events.iter().any(|e| matches!(e, HexViewEvent::ScrollRequest { .. })));
    }

    #[test]
    fn test_set_source_resets_state() {
        // Arrange
        let mut view = view_over(vec![0x10, 0x20]);
        view.apply_nibble_edit(0xA).unwrap();
        view.move_caret(2, false);

        // Act
        let old = view.set_source(MemorySource::new(vec![0xFF; 8]));

        // Assert - caret reset, history gone, old source handed back
        assert_eq!(view.current_nibble(), 0);
        assert!(!view.can_undo());
        assert!(!view.is_any_modified());
        assert_eq!(old.as_bytes()[0], 0xA0);
    }

    #[test]
    fn test_data_changed_revalidates_caret() {
        // Arrange - caret at the end of an 8-byte source
        let mut view = view_over(vec![0; 8]);
        view.move_caret(16, false);

        // Act - source shrinks underneath the view
        view.source_mut().truncate(2);
        view.data_changed();

        // Assert
        assert_eq!(view.current_nibble(), 4);
    }

    #[test]
    fn test_find_text_truncates_code_points() {
        // Arrange
        let mut bytes = b"header: caf\xE9".to_vec();
        bytes.extend_from_slice(b" trailer");
        let view = HexView::new(MemorySource::new(bytes));

        // Act - U+00E9 truncates to the byte 0xE9
        let found = view.find_text(0, "caf\u{e9}", true);

        // Assert
        assert_eq!(found, Some(8));
    }
}
