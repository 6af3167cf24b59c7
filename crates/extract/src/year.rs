use once_cell::sync::Lazy;
use regex::Regex;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"19[89][0-9]|20[0-9][0-9]").unwrap());

/// A year token and its byte span in the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMatch {
    pub value: i32,
    pub start: usize,
    pub end: usize,
}

fn collides(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();

    before.is_some_and(|c| c.is_ascii_digit())
        || after.is_some_and(|c| c.is_ascii_digit() || matches!(c.to_ascii_lowercase(), 'k' | 'l' | 'm'))
}

/// First 1980-2099 token that isn't glued to other digits or to a price suffix.
pub fn find_year(text: &str) -> Option<YearMatch> {
    // Scan every start offset so a rejected candidate doesn't hide an
    // overlapping one right after it.
    let mut from = 0;
    while let Some(m) = YEAR.find_at(text, from) {
        if !collides(text, m.start(), m.end()) {
            if let Ok(value) = m.as_str().parse() {
                return Some(YearMatch {
                    value,
                    start: m.start(),
                    end: m.end(),
                });
            }
        }
        from = m.start() + 1;
    }
    None
}

pub fn extract_year(text: &str) -> Option<i32> {
    find_year(text).map(|m| m.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_year() {
        assert_eq!(extract_year("toyota prius 2015 petrol"), Some(2015));
        assert_eq!(extract_year("1998"), Some(1998));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(extract_year("1975 beetle"), None);
        assert_eq!(extract_year("2150"), None);
    }

    #[test]
    fn test_price_suffix_collision() {
        assert_eq!(extract_year("2000k"), None);
        assert_eq!(extract_year("under 2000L"), None);
        assert_eq!(extract_year("2010m"), None);
    }

    #[test]
    fn test_digit_neighbours() {
        assert_eq!(extract_year("120150"), None);
        assert_eq!(extract_year("320000"), None);
    }

    #[test]
    fn test_first_valid_match_wins() {
        assert_eq!(extract_year("2000k budget, 2012 model or 2016"), Some(2012));
    }

    #[test]
    fn test_non_ascii_digits_are_skipped() {
        // Arabic-Indic "٢٠١٥" is not a year token; scanning continues.
        assert_eq!(extract_year("\u{662}\u{660}\u{661}\u{665} or 2016"), Some(2016));
    }

    #[test]
    fn test_span() {
        let m = find_year("axio 2014 white").unwrap();
        assert_eq!((m.start, m.end), (5, 9));
    }
}
