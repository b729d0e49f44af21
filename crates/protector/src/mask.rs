//! Masking of values before they reach a log sink.
//!
//! Only pass already non-secret summaries through here (bundle JSON, token
//! prefixes). Derived keys and raw passwords must never be logged at all,
//! masked or not.

use std::fmt;

/// Characters kept at each end when no mask length is given.
pub const DEFAULT_MASK_LENGTH: usize = 4;

/// Text that replaces the hidden middle.
pub const PLACEHOLDER: &str = "****";

/// Keep the first and last `mask_length` characters of `data`, hiding the rest.
///
/// `mask("abcdefgh12", 4)` is `"abcd****gh12"`. A `mask_length` of zero
/// means [`DEFAULT_MASK_LENGTH`].
///
/// When `data` is too short to hide anything (`2 * mask_length` characters or
/// fewer) only the placeholder is returned. This deliberately differs from the
/// overlapping head-plus-tail form, where `"abcdef"` would render as
/// `"abcd****cdef"` and so reveal the whole value.
pub fn mask(data: &str, mask_length: usize) -> String {
    let mask_length = match mask_length {
        0 => DEFAULT_MASK_LENGTH,
        n => n,
    };
    let total = data.chars().count();
    if total <= mask_length.saturating_mul(2) {
        return PLACEHOLDER.to_owned();
    }
    let head: String = data.chars().take(mask_length).collect();
    let tail: String = data.chars().skip(total - mask_length).collect();
    format!("{head}{PLACEHOLDER}{tail}")
}

/// [`Display`](fmt::Display) adapter that masks on formatting.
///
/// Intended for `tracing` fields: `info!(bundle = %Masked::new(&json), "...")`.
#[derive(Debug, Clone, Copy)]
pub struct Masked<'a> {
    data: &'a str,
    mask_length: usize,
}

impl<'a> Masked<'a> {
    /// Mask `data` with [`DEFAULT_MASK_LENGTH`].
    pub fn new(data: &'a str) -> Self {
        Self::with_length(data, DEFAULT_MASK_LENGTH)
    }

    /// Mask `data`, keeping `mask_length` characters at each end.
    pub fn with_length(data: &'a str, mask_length: usize) -> Self {
        Self { data, mask_length }
    }
}

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask(self.data, self.mask_length))
    }
}
