//! # `hexviewlib`
//!
//! `hexviewlib` is the logic kernel behind an interactive hex viewer/editor
//! widget: everything with real state and invariants, none of the pixels.
//!
//! The library provides:
//! - Caret/selection tracking in half-byte (nibble) resolution via [`HexView`].
//! - An externally supplied data abstraction with availability semantics via
//!   [`ByteSource`] and the in-memory [`MemorySource`].
//! - Ten prioritized levels of colorized byte ranges ([`ColorLayers`]).
//! - Boyer-Moore pattern search plus a regex mode ([`find_index_of`],
//!   [`find_regex`]).
//! - A reversible edit log with per-offset modification counters
//!   ([`EditLog`]).
//!
//! Rendering, hit-testing, clipboard handling, and key binding are left to
//! the presentation layer, which drives the kernel through plain method
//! calls and drains its output events.
//!
//! ## Example
//!
//! ```
//! use hexviewlib::{HexView, MemorySource};
//!
//! let mut view = HexView::new(MemorySource::new(vec![0x10, 0x20, 0x30, 0x40]));
//!
//! view.apply_nibble_edit(0xA).unwrap();
//! assert_eq!(view.source().as_bytes(), &[0xA0, 0x20, 0x30, 0x40]);
//!
//! view.undo().unwrap();
//! assert_eq!(view.source().as_bytes(), &[0x10, 0x20, 0x30, 0x40]);
//! ```

mod editlog;
mod error;
mod ranges;
mod search;
mod source;
mod view;

// Public APIs
pub use editlog::{DataEdit, EditLog};
pub use error::HexViewError;
pub use ranges::{COLOR_LEVELS, Color, ColorLayers, ColoredRange, ColoredRangeManager, colors};
pub use search::{find_index_of, find_regex};
#[cfg(feature = "benchmarking")]
pub use search::bench_priv_tables;
pub use source::{ByteSource, DataChanged, DataListener, MemorySource, SubscriptionId};
pub use view::{ActiveView, AddressMode, EditOutcome, HexView, HexViewEvent, NibblePosition};
