use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::schema::PriceRange;
use crate::units;

// Alternation order matters: the regex engine is leftmost-first, so "m" is
// tried before "million". Both map to the same multiplier.
const NUM: &str = r"([\d,]+(?:\.\d+)?)";
const UNIT: &str = r"(m|mil|million|l|lakh|k|thousand|rs)?";

static UPPER_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(under|less than|below|max|maximum)\s*{NUM}\s*{UNIT}"
    ))
    .unwrap()
});

static LOWER_BOUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(over|above|more than|min|minimum)\s*{NUM}\s*{UNIT}"
    ))
    .unwrap()
});

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(between|from)?\s*{NUM}\s*(?:to|and|-)\s*{NUM}\s*{UNIT}"
    ))
    .unwrap()
});

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b{NUM}\s*{UNIT}\b")).unwrap());

const FLOOR_HINTS: [&str; 4] = ["min", "minimum", "over", "above"];
const YEAR_BAND: std::ops::RangeInclusive<f64> = 1900.0..=2100.0;

/// Parse "1,250.5" style figures. A capture made only of separators is not a number.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn scaled(caps: &Captures, amount_group: usize, unit_group: usize) -> Option<f64> {
    let amount = parse_amount(caps.get(amount_group)?.as_str())?;
    let unit = caps.get(unit_group).map(|m| m.as_str());
    Some(amount * units::multiplier(unit))
}

fn upper_bound(text: &str) -> Option<f64> {
    UPPER_BOUND
        .captures(text)
        .and_then(|caps| scaled(&caps, 2, 3))
}

fn lower_bound(text: &str) -> Option<f64> {
    LOWER_BOUND
        .captures(text)
        .and_then(|caps| scaled(&caps, 2, 3))
}

fn range(text: &str) -> Option<(f64, f64)> {
    let caps = RANGE.captures(text)?;
    let multiplier = units::multiplier(caps.get(4).map(|m| m.as_str()));
    let low = parse_amount(caps.get(2)?.as_str())?;
    let high = parse_amount(caps.get(3)?.as_str())?;
    Some((low * multiplier, high * multiplier))
}

fn bare_number(text: &str) -> Option<f64> {
    BARE_NUMBER
        .captures(text)
        .and_then(|caps| scaled(&caps, 1, 2))
}

/// Extract a price range from a query or a single entity span.
///
/// Four pattern families run in order and later ones overwrite earlier
/// results: ceiling keyword, floor keyword, two-number range, and finally a
/// bare number used only when nothing else matched.
pub fn extract_price_range(text: &str) -> PriceRange {
    extract_price_range_with(text, text)
}

/// Same as [`extract_price_range`], except the bare-number pattern searches
/// `bare_text` instead of `text`. Keyword and range patterns, and the floor
/// hint check, always see `text`.
pub fn extract_price_range_with(text: &str, bare_text: &str) -> PriceRange {
    let text = text.to_lowercase();
    let mut range_out = PriceRange::default();

    if let Some(max) = upper_bound(&text) {
        range_out.max = Some(max);
    }

    if let Some(min) = lower_bound(&text) {
        range_out.min = Some(min);
    }

    if let Some((min, max)) = range(&text) {
        range_out.min = Some(min);
        range_out.max = Some(max);
    }

    if range_out.is_empty() {
        if let Some(value) = bare_number(&bare_text.to_lowercase()) {
            let has_floor_hint = FLOOR_HINTS.iter().any(|hint| text.contains(hint));
            // A floor keyword that failed to parse structurally: only take
            // the number when it can't be a model year.
            if !has_floor_hint || !YEAR_BAND.contains(&value) {
                range_out.max = Some(value);
            }
        }
    }

    range_out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(text: &str) -> (Option<f64>, Option<f64>) {
        let range = extract_price_range(text);
        (range.min, range.max)
    }

    #[test]
    fn test_ceiling_keyword() {
        assert_eq!(bounds("under 5 million"), (None, Some(5_000_000.0)));
        assert_eq!(bounds("less than 750k"), (None, Some(750_000.0)));
        assert_eq!(bounds("Maximum 3.5 mil"), (None, Some(3_500_000.0)));
    }

    #[test]
    fn test_floor_keyword() {
        assert_eq!(bounds("over 20 lakh"), (Some(2_000_000.0), None));
        assert_eq!(bounds("more than 1,500,000"), (Some(1_500_000.0), None));
    }

    #[test]
    fn test_range_sets_both_bounds() {
        assert_eq!(
            bounds("between 10 and 15 lakh"),
            (Some(1_000_000.0), Some(1_500_000.0))
        );
        assert_eq!(bounds("from 2 to 3 million"), (Some(2_000_000.0), Some(3_000_000.0)));
        assert_eq!(bounds("40-60k"), (Some(40_000.0), Some(60_000.0)));
    }

    #[test]
    fn test_range_overwrites_keyword_bounds() {
        // "under 5" feeds the ceiling, then "5 to 8 lakh" overwrites both.
        assert_eq!(bounds("under 5 to 8 lakh"), (Some(500_000.0), Some(800_000.0)));
    }

    #[test]
    fn test_ceiling_and_floor_together() {
        assert_eq!(
            bounds("above 2 million but below 4 million"),
            (Some(2_000_000.0), Some(4_000_000.0))
        );
    }

    #[test]
    fn test_bare_number_is_ceiling() {
        assert_eq!(bounds("2000k"), (None, Some(2_000_000.0)));
        assert_eq!(bounds("aqua 45 lakh"), (None, Some(4_500_000.0)));
        assert_eq!(bounds("budget 650000"), (None, Some(650_000.0)));
    }

    #[test]
    fn test_floor_hint_with_year_like_number_yields_nothing() {
        // "minimum" is present but not followed by a number, and 2015 sits
        // inside the year band.
        assert_eq!(bounds("minimum price car 2015"), (None, None));
    }

    #[test]
    fn test_floor_hint_with_large_number_is_ceiling() {
        assert_eq!(bounds("minimum price 3000000"), (None, Some(3_000_000.0)));
    }

    #[test]
    fn test_no_numbers() {
        assert_eq!(bounds("toyota aqua colombo"), (None, None));
        assert_eq!(bounds(""), (None, None));
    }

    #[test]
    fn test_bare_text_only_affects_bare_number() {
        let range = extract_price_range_with("under 2000 k", "under      k");
        assert_eq!(range.max, Some(2_000_000.0));

        let range = extract_price_range_with("aqua 2015", "aqua     ");
        assert!(range.is_empty());
    }

    #[test]
    fn test_separator_only_capture_is_ignored() {
        assert_eq!(bounds("under , please"), (None, None));
    }
}
