use vastra_core::carrier::{AddressParser, ParsedAddress};

const FALLBACK_CITY: &str = "Unknown";
const FALLBACK_STATE: &str = "Unknown";
const FALLBACK_PINCODE: &str = "000000";

/// Best-effort decomposition of the free-text address stored on an order.
///
/// Heuristic: a trailing 5-6 digit token is the pincode (5 digits get a
/// trailing zero appended); of the remaining comma-split segments the last is
/// the state, the second-to-last the city, and the rest the street. Multi-line
/// or non-comma-delimited addresses can silently mis-parse; callers get the
/// documented fallbacks rather than an error.
pub struct HeuristicAddressParser;

impl AddressParser for HeuristicAddressParser {
    fn parse(&self, raw: &str) -> ParsedAddress {
        let (remainder, pincode) = extract_pincode(raw);

        let segments: Vec<&str> = remainder
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let (street, city, state) = match segments.len() {
            0 => (
                remainder.trim().to_string(),
                FALLBACK_CITY.to_string(),
                FALLBACK_STATE.to_string(),
            ),
            1 => (
                segments[0].to_string(),
                FALLBACK_CITY.to_string(),
                FALLBACK_STATE.to_string(),
            ),
            2 => (
                segments[0].to_string(),
                segments[0].to_string(),
                segments[1].to_string(),
            ),
            n => (
                segments[..n - 2].join(", "),
                segments[n - 2].to_string(),
                segments[n - 1].to_string(),
            ),
        };

        ParsedAddress {
            street,
            city,
            state,
            pincode: pincode.unwrap_or_else(|| FALLBACK_PINCODE.to_string()),
        }
    }
}

/// Strip the trailing 5-6 digit pincode token, if any, and return what's left.
fn extract_pincode(raw: &str) -> (String, Option<String>) {
    let trimmed = raw.trim_end();
    let digits: String = trimmed
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    if digits.len() < 5 || digits.len() > 6 {
        return (trimmed.to_string(), None);
    }

    let mut remainder = trimmed[..trimmed.len() - digits.len()].to_string();
    // Drop the separator the pincode was attached with ("- 560001", ", 560001")
    while remainder.ends_with([' ', '-', ',']) {
        remainder.pop();
    }

    let pincode = if digits.len() == 5 {
        format!("{}0", digits)
    } else {
        digits
    };

    (remainder, Some(pincode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_standard_indian_address() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("12 MG Road, Bangalore, Karnataka - 560001");
        assert_eq!(parsed.street, "12 MG Road");
        assert_eq!(parsed.city, "Bangalore");
        assert_eq!(parsed.state, "Karnataka");
        assert_eq!(parsed.pincode, "560001");
    }

    #[test]
    fn test_multi_segment_street() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("Flat 4B, Rose Apartments, Linking Road, Mumbai, Maharashtra, 400050");
        assert_eq!(parsed.street, "Flat 4B, Rose Apartments, Linking Road");
        assert_eq!(parsed.city, "Mumbai");
        assert_eq!(parsed.state, "Maharashtra");
        assert_eq!(parsed.pincode, "400050");
    }

    #[test]
    fn test_five_digit_pincode_padded() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("8 Park Street, Kolkata, West Bengal 70001");
        assert_eq!(parsed.pincode, "700010");
    }

    #[test]
    fn test_missing_pincode_falls_back() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("12 MG Road, Bangalore, Karnataka");
        assert_eq!(parsed.pincode, "000000");
        assert_eq!(parsed.city, "Bangalore");
        assert_eq!(parsed.state, "Karnataka");
    }

    #[test]
    fn test_single_segment_uses_fallbacks() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("Somewhere without commas 560001");
        assert_eq!(parsed.street, "Somewhere without commas");
        assert_eq!(parsed.city, "Unknown");
        assert_eq!(parsed.state, "Unknown");
        assert_eq!(parsed.pincode, "560001");
    }

    #[test]
    fn test_two_segments_reuse_city() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("Chennai, Tamil Nadu - 600001");
        assert_eq!(parsed.city, "Chennai");
        assert_eq!(parsed.state, "Tamil Nadu");
        assert_eq!(parsed.street, "Chennai");
    }

    #[test]
    fn test_seven_digit_trailing_number_is_not_a_pincode() {
        let parser = HeuristicAddressParser;
        let parsed = parser.parse("Warehouse 1234567, Pune, Maharashtra");
        assert_eq!(parsed.pincode, "000000");
    }
}
