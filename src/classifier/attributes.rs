use crate::model::InferredAttributes;
use crate::normalizer::{normalize_text, title_case};
use crate::vocab::{COLORS, INSEAM_PATTERNS, LENGTH_TERMS, SIZES};
use tracing::debug;

/// Length forced onto any variant whose size names a "big" cut.
pub const BIG_AND_TALL: &str = "Big & Tall";

const INSEAM_RANGE: std::ops::RangeInclusive<u32> = 20..=50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Size,
    Length,
    Color,
}

/// Decides which attribute a normalized option value describes.
/// Size wins over length, length over color.
fn option_slot(value: &str) -> Option<Slot> {
    if SIZES.contains(value) {
        Some(Slot::Size)
    } else if LENGTH_TERMS.iter().any(|t| value.contains(t)) {
        Some(Slot::Length)
    } else if COLORS.iter().any(|c| value.contains(c)) {
        Some(Slot::Color)
    } else {
        None
    }
}

/// Infers size, color, length and inseam for one variant.
///
/// Option values are consulted first, in declared order; the variant title fills
/// whatever is still missing. A slot is never overwritten once filled.
pub fn classify(
    option_values: &[&str],
    variant_title: &str,
    product_title: &str,
) -> InferredAttributes {
    let mut attrs = InferredAttributes::default();

    for raw in option_values {
        let value = normalize_text(raw);
        if value.is_empty() {
            continue;
        }
        let target = match option_slot(&value) {
            Some(Slot::Size) => &mut attrs.size,
            Some(Slot::Length) => &mut attrs.length,
            Some(Slot::Color) => &mut attrs.color,
            None => continue,
        };
        if target.is_none() {
            *target = Some(value);
        }
    }

    let title = variant_title.to_lowercase();
    if attrs.size.is_none() {
        attrs.size = SIZES
            .longest_first()
            .iter()
            .find(|token| title.contains(token.as_str()))
            .map(|token| token.to_uppercase());
    }
    if attrs.color.is_none() {
        attrs.color = first_term_in(COLORS, &title);
    }
    if attrs.length.is_none() {
        attrs.length = first_term_in(LENGTH_TERMS, &title);
    }

    if attrs
        .size
        .as_deref()
        .is_some_and(|size| size.to_lowercase().contains("big"))
    {
        attrs.size = None;
        attrs.length = Some(BIG_AND_TALL.to_string());
    }

    let candidates = option_values
        .iter()
        .copied()
        .chain([variant_title, product_title]);
    attrs.inseam = detect_inseam(candidates, INSEAM_PATTERNS);

    debug!(?attrs, variant_title, "classified variant");
    attrs
}

fn first_term_in(terms: &[&str], title: &str) -> Option<String> {
    terms
        .iter()
        .find(|term| title.contains(*term))
        .map(|term| title_case(term))
}

/// Scans candidates in order, and patterns in order within each candidate.
/// The inseam is the two-digit number embedded in the first matching pattern
/// that lies in 20..=50; matches outside that range are passed over.
pub fn detect_inseam<'a>(
    candidates: impl IntoIterator<Item = &'a str>,
    patterns: &[&str],
) -> Option<u32> {
    for candidate in candidates {
        let text = normalize_text(candidate);
        if text.is_empty() {
            continue;
        }
        for pattern in patterns {
            if !text.contains(&pattern.to_lowercase()) {
                continue;
            }
            match first_two_digits(pattern) {
                Some(n) if INSEAM_RANGE.contains(&n) => return Some(n),
                _ => continue,
            }
        }
    }
    None
}

/// First run of two consecutive ASCII digits, as a number.
fn first_two_digits(text: &str) -> Option<u32> {
    text.as_bytes()
        .windows(2)
        .find(|w| w[0].is_ascii_digit() && w[1].is_ascii_digit())
        .map(|w| u32::from(w[0] - b'0') * 10 + u32::from(w[1] - b'0'))
}
