//! Pattern search over a byte source.
//!
//! The byte/text search uses the classical Boyer-Moore two-table scheme: a
//! 256-entry bad-character table plus a suffix-based good-suffix table, with
//! the scan comparing right-to-left over the current alignment window. Each
//! comparison reads exactly one byte from the source, which keeps the engine
//! usable against partially available data at interactive sizes.
//!
//! A regex mode is also provided; it batch-reads the searched span and
//! delegates to `regex::bytes`.

use crate::source::ByteSource;
use regex::bytes::Regex;

/// Whether `byte` is printable ASCII (space through tilde).
#[must_use]
pub(crate) const fn is_printable_byte(byte: u8) -> bool {
    byte >= 0x20 && byte <= 0x7E
}

/// Lower-cases `byte` when case-insensitive matching is requested and the
/// byte maps to a printable character; non-printable bytes pass through.
const fn normalize_byte(byte: u8, case_sensitive: bool) -> u8 {
    if !case_sensitive && is_printable_byte(byte) {
        byte.to_ascii_lowercase()
    } else {
        byte
    }
}

/// Returns the start offset of the first occurrence of `pattern` within
/// `[start_offset, start_offset + search_length)`, or `None`.
///
/// The empty pattern matches immediately at `start_offset`. The search span
/// is clamped so it never exceeds the source length; a clamped span of zero
/// bytes yields `None`. Bytes that are not currently available never match.
///
/// # Example
/// ```
/// use hexviewlib::{MemorySource, find_index_of};
///
/// let source = MemorySource::new(b"ABCABCABD".to_vec());
/// assert_eq!(find_index_of(&source, 0, 9, b"ABD", true), Some(6));
/// assert_eq!(find_index_of(&source, 0, 9, b"abd", false), Some(6));
/// assert_eq!(find_index_of(&source, 0, 9, b"XYZ", true), None);
/// ```
pub fn find_index_of<S: ByteSource + ?Sized>(
    source: &S,
    start_offset: u64,
    search_length: u64,
    pattern: &[u8],
    case_sensitive: bool,
) -> Option<u64> {
    if pattern.is_empty() {
        return Some(start_offset);
    }

    let data_length = source.len();
    if start_offset >= data_length {
        return None;
    }
    let search_length = search_length.min(data_length - start_offset);
    if search_length == 0 {
        return None;
    }

    // Normalize the pattern once; source bytes are normalized per comparison.
    let pattern: Vec<u8> = pattern
        .iter()
        .map(|&b| normalize_byte(b, case_sensitive))
        .collect();

    let byte_table = make_byte_table(&pattern);
    let offset_table = make_offset_table(&pattern);

    let end = start_offset + search_length;
    let mut i = start_offset + pattern.len() as u64 - 1;
    while i < end {
        let mut j = pattern.len() - 1;
        loop {
            let b = normalize_byte(source.read_byte(i)?, case_sensitive);
            if pattern[j] != b {
                i += u64::max(
                    offset_table[pattern.len() - 1 - j] as u64,
                    byte_table[b as usize] as u64,
                );
                break;
            }
            if j == 0 {
                return Some(i);
            }
            i -= 1;
            j -= 1;
        }
    }
    None
}

/// Returns the start offset of the first regex match at or after
/// `start_offset`, or `None`.
///
/// Invalid patterns and unavailable data yield no match.
pub fn find_regex<S: ByteSource + ?Sized>(source: &S, start_offset: u64, pattern: &str) -> Option<u64> {
    let data_length = source.len();
    if start_offset >= data_length {
        return None;
    }
    let re = Regex::new(pattern).ok()?;

    #[allow(clippy::cast_possible_truncation)]
    let haystack = source.read(start_offset, (data_length - start_offset) as usize)?;

    re.find(&haystack).map(|m| start_offset + m.start() as u64)
}

/// Jump table keyed by the mismatched byte value: distance to shift based on
/// the pattern's last occurrence of each byte, defaulting to the pattern
/// length.
fn make_byte_table(pattern: &[u8]) -> [usize; 256] {
    let mut table = [pattern.len(); 256];
    for i in 0..pattern.len() - 1 {
        table[pattern[i] as usize] = pattern.len() - 1 - i;
    }
    table
}

/// Jump table keyed by the scan depth at which the mismatch occurs. Handles
/// repeated suffixes, including partial suffix reuse via prefix detection.
fn make_offset_table(pattern: &[u8]) -> Vec<usize> {
    let len = pattern.len();
    let mut table = vec![0; len];

    let mut last_prefix_pos = len;
    for i in (0..len).rev() {
        if is_prefix(pattern, i + 1) {
            last_prefix_pos = i + 1;
        }
        table[len - 1 - i] = last_prefix_pos - i + len - 1;
    }
    for i in 0..len - 1 {
        let suffix_len = suffix_length(pattern, i);
        table[suffix_len] = len - 1 - i + suffix_len;
    }
    table
}

/// Is `pattern[p..]` a prefix of `pattern`?
fn is_prefix(pattern: &[u8], p: usize) -> bool {
    let mut j = 0;
    for i in p..pattern.len() {
        if pattern[i] != pattern[j] {
            return false;
        }
        j += 1;
    }
    true
}

/// Maximum length of the subpattern that ends at `p` and is also a suffix.
fn suffix_length(pattern: &[u8], p: usize) -> usize {
    let mut len = 0;
    let mut i = p;
    let mut j = pattern.len() - 1;
    loop {
        if pattern[i] != pattern[j] {
            break;
        }
        len += 1;
        if i == 0 {
            break;
        }
        i -= 1;
        j -= 1;
    }
    len
}

/// Exposes the private skip-table builders to the bench harness.
#[cfg(feature = "benchmarking")]
#[must_use]
pub fn bench_priv_tables(pattern: &[u8]) -> ([usize; 256], Vec<usize>) {
    (make_byte_table(pattern), make_offset_table(pattern))
}
