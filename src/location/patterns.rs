//! Regex pattern tables for US / non-US location detection.
//!
//! Inputs are lower-cased and trimmed before matching. Non-US patterns are
//! evaluated before US patterns: a "Remote - Canada" posting must not slip
//! through on the generic "remote" form.

use std::sync::OnceLock;

use regex::Regex;

static NON_US: OnceLock<Vec<Regex>> = OnceLock::new();
static US: OnceLock<Vec<Regex>> = OnceLock::new();

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid location pattern"))
        .collect()
}

/// Patterns that mark a location as outside the US.
pub fn non_us_patterns() -> &'static [Regex] {
    NON_US.get_or_init(|| {
        compile(&[
            // "Remote - <country/region>" forms
            r"remote\s*[-–(]\s*(uk|europe|emea|apac|latam|canada|india|germany|france|australia|japan|singapore)",
            // Europe
            r"\b(london|uk|united kingdom|england|britain|scotland|wales|ireland|dublin)\b",
            r"\b(germany|berlin|munich|france|paris|netherlands|amsterdam|sweden|stockholm|switzerland|zurich)\b",
            r"\b(spain|madrid|barcelona|italy|rome|milan|poland|warsaw|portugal|lisbon|austria|vienna)\b",
            // Asia and Middle East
            r"\b(singapore|japan|tokyo|china|beijing|shanghai|india|bangalore|mumbai|delhi|hyderabad)\b",
            r"\b(israel|tel aviv|korea|seoul|taiwan|taipei|hong kong|thailand|bangkok|vietnam|philippines)\b",
            // Americas outside the US
            r"\b(canada|toronto|vancouver|montreal|ottawa|mexico|brazil|sao paulo|argentina|buenos aires)\b",
            // Oceania
            r"\b(australia|sydney|melbourne|brisbane|new zealand|auckland|wellington)\b",
        ])
    })
}

/// Patterns that mark a location as inside the US.
pub fn us_patterns() -> &'static [Regex] {
    US.get_or_init(|| {
        compile(&[
            // Bare "remote" variants only as the whole string
            r"^(remote|us\s*-?\s*remote|remote\s*-?\s*us|remote\s*\(us\))$",
            // "<city>, <state abbreviation>"
            r"\b[\w. ]+,\s*(al|ak|az|ar|ca|co|ct|de|fl|ga|hi|id|il|in|ia|ks|ky|la|me|md|ma|mi|mn|ms|mo|mt|ne|nv|nh|nj|nm|ny|nc|nd|oh|ok|or|pa|ri|sc|sd|tn|tx|ut|vt|va|wa|wv|wi|wy)\b",
            // Major cities
            r"\b(new york|san francisco|los angeles|chicago|boston|seattle|austin|denver|atlanta|miami)\b",
            // State names
            r"\b(california|texas|florida|new york|washington)\b",
            // Regional shorthand
            r"\b(silicon valley|bay area|nyc|sf)\b",
            // Explicit country
            r"\b(usa|united states|u\.s\.)\b",
        ])
    })
}

/// First-match verdict over both tables; `None` when nothing matched.
pub fn pattern_match(location_lower: &str) -> Option<bool> {
    for pattern in non_us_patterns() {
        if pattern.is_match(location_lower) {
            log::debug!("'{location_lower}' matched non-US pattern: {pattern}");
            return Some(false);
        }
    }
    for pattern in us_patterns() {
        if pattern.is_match(location_lower) {
            log::debug!("'{location_lower}' matched US pattern: {pattern}");
            return Some(true);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_abbreviations_match_us() {
        assert_eq!(pattern_match("san francisco, ca"), Some(true));
        assert_eq!(pattern_match("austin, tx"), Some(true));
        assert_eq!(pattern_match("new york, ny"), Some(true));
    }

    #[test]
    fn whole_string_remote_is_us() {
        assert_eq!(pattern_match("remote"), Some(true));
        assert_eq!(pattern_match("us - remote"), Some(true));
        assert_eq!(pattern_match("remote (us)"), Some(true));
    }

    #[test]
    fn remote_with_country_is_not_us() {
        assert_eq!(pattern_match("remote - canada"), Some(false));
        assert_eq!(pattern_match("remote - europe"), Some(false));
        assert_eq!(pattern_match("remote - uk"), Some(false));
    }

    #[test]
    fn foreign_cities_are_not_us() {
        assert_eq!(pattern_match("london, uk"), Some(false));
        assert_eq!(pattern_match("singapore"), Some(false));
        assert_eq!(pattern_match("toronto, canada"), Some(false));
        assert_eq!(pattern_match("berlin, germany"), Some(false));
    }

    #[test]
    fn non_us_wins_over_us_patterns() {
        // "in" is also a state abbreviation; the country table runs first.
        assert_eq!(pattern_match("bangalore, india"), Some(false));
    }

    #[test]
    fn unknown_location_has_no_verdict() {
        assert_eq!(pattern_match("zzqxvtopolis"), None);
    }
}
