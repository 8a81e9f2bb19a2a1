//! Due-date extraction.
//!
//! Three strategies in strict priority order: a keyword-anchored
//! high-precision match, any date on a line holding a due-date
//! keyword, and finally the chronologically closest future date found
//! anywhere in the document.

use chrono::NaiveDate;
use regex::Regex;

const KEYWORDS: [&str; 3] = ["vencimento", "vence em", "pagar ate"];

/// Returns the due date verbatim as it appears in the text, or `None`
/// when no strategy succeeds. `today` is injected so the future-date
/// fallback is testable; production passes the current local date.
pub fn extract_due_date(text: &str, today: NaiveDate) -> Option<String> {
    keyword_anchored(text)
        .or_else(|| keyword_line(text))
        .or_else(|| nearest_future(text, today))
}

/// Strategy 1: keyword immediately followed by a strict DD/MM/YYYY.
fn keyword_anchored(text: &str) -> Option<String> {
    let pattern =
        Regex::new(r"(?:vencimento|vence\s*em|pagar\s+ate)\s*[:\-]?\s*(\d{2}/\d{2}/\d{4})")
            .unwrap();
    pattern.captures(text).map(|capture| capture[1].to_string())
}

/// Strategy 2: first date token on any line carrying a keyword.
fn keyword_line(text: &str) -> Option<String> {
    let date_token = Regex::new(r"\d{2}/\d{2}/\d{2,4}").unwrap();
    for line in text.lines() {
        if KEYWORDS.iter().any(|keyword| line.contains(keyword)) {
            if let Some(found) = date_token.find(line) {
                return Some(found.as_str().to_string());
            }
        }
    }
    None
}

/// Strategy 3: the chronologically closest date on or after `today`.
/// Ties resolve to the first occurrence of the minimum date value.
fn nearest_future(text: &str, today: NaiveDate) -> Option<String> {
    let date_token = Regex::new(r"\d{2}/\d{2}/\d{2,4}").unwrap();
    let mut closest: Option<(NaiveDate, String)> = None;
    for found in date_token.find_iter(text) {
        let Some(date) = parse_date(found.as_str()) else {
            continue;
        };
        if date < today {
            continue;
        }
        match &closest {
            Some((best, _)) if *best <= date => {}
            _ => closest = Some((date, found.as_str().to_string())),
        }
    }
    closest.map(|(_, raw)| raw)
}

/// Parses a DD/MM/YY(YY) token. Two-digit years are assumed to live in
/// this century.
fn parse_date(token: &str) -> Option<NaiveDate> {
    let mut parts = token.splitn(3, '/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_part = parts.next()?;
    let year: i32 = if year_part.len() == 2 {
        format!("20{year_part}").parse().ok()?
    } else {
        year_part.parse().ok()?
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn keyword_anchored_date_wins() {
        let text = "conta de energia vencimento: 15/08/2025 valor total r$ 100,00";
        assert_eq!(extract_due_date(text, today()), Some("15/08/2025".to_string()));
    }

    #[test]
    fn keyword_with_dash_separator() {
        let text = "pagar ate - 02/09/2025";
        assert_eq!(extract_due_date(text, today()), Some("02/09/2025".to_string()));
    }

    #[test]
    fn same_line_fallback_accepts_short_year() {
        // The strict pattern rejects two-digit years, the line scan
        // does not.
        let text = "emissao 01/05/25\ndata de vencimento 15/08/25 nao perca o prazo";
        assert_eq!(extract_due_date(text, today()), Some("15/08/25".to_string()));
    }

    #[test]
    fn nearest_future_date_fallback() {
        let text = "historico 01/01/2020 proxima leitura 20/12/2099";
        assert_eq!(extract_due_date(text, today()), Some("20/12/2099".to_string()));
    }

    #[test]
    fn fallback_picks_closest_of_several_future_dates() {
        let text = "01/07/2025 e depois 20/12/2099";
        assert_eq!(extract_due_date(text, today()), Some("01/07/2025".to_string()));
    }

    #[test]
    fn fallback_expands_two_digit_years() {
        let text = "leitura prevista 05/07/30";
        assert_eq!(extract_due_date(text, today()), Some("05/07/30".to_string()));
    }

    #[test]
    fn fallback_skips_invalid_calendar_dates() {
        let text = "codigo 99/99/2025 proxima 10/10/2025";
        assert_eq!(extract_due_date(text, today()), Some("10/10/2025".to_string()));
    }

    #[test]
    fn duplicate_minimum_dates_are_deterministic() {
        let text = "10/10/2025 outra via 10/10/2025";
        assert_eq!(extract_due_date(text, today()), Some("10/10/2025".to_string()));
    }

    #[test]
    fn no_dates_yields_none() {
        assert_eq!(extract_due_date("documento sem datas", today()), None);
        // Only past dates is also a failure.
        assert_eq!(extract_due_date("emitido em 01/01/2020", today()), None);
    }
}
