//! Scalar attribute formats

use chrono::NaiveDate;

/// Date format of the `Date` attribute (`yyyy-MM-dd`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Parse `TRUE` / `FALSE` in any case
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" False "), Some(false));
        assert_eq!(parse_bool("1"), None);
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(format_bool(true), "TRUE");
        assert_eq!(format_bool(false), "FALSE");
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "2024-03-07");
        assert_eq!(parse_date("2024-03-07"), Some(date));
        assert_eq!(parse_date("07/03/2024"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }
}
