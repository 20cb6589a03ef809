//! Posted-date classification
//!
//! Job boards print "posted" information in many human-readable shapes
//! ("hoje", "há 3 dias", "12/05/2023", "12 de mai", ISO timestamps). This
//! module maps such strings onto a coarse recency bucket so cards can be
//! filtered before paying for a detail fetch.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Coarse age of a posting, ordered from newest to oldest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecencyBucket {
    /// Posted within the last 24 hours
    Day,
    /// Posted within the last 7 days
    Week,
    /// Posted within the last 30 days
    Month,
    /// Anything older
    Older,
}

impl RecencyBucket {
    /// Buckets an age expressed in whole days
    pub fn from_age_days(days: i64) -> Self {
        match days {
            i64::MIN..=0 => Self::Day,
            1..=7 => Self::Week,
            8..=30 => Self::Month,
            _ => Self::Older,
        }
    }

    /// Upper bound of the bucket in seconds (the unit job boards use)
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Day => 86_400,
            Self::Week => 604_800,
            Self::Month => 2_592_000,
            Self::Older => 25_920_000,
        }
    }
}

const PT_MONTHS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

fn relative_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(\d+)\s*(minutos?|min|horas?|hours?|h|dias?|days?|semanas?|weeks?|m[eê]s(?:es)?|months?)\b",
        )
        .expect("relative date pattern is valid")
    })
}

fn iso_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("iso pattern is valid"))
}

fn numeric_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?").expect("numeric date pattern is valid")
    })
}

fn month_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s+(?:de\s+)?([a-z]{3})[a-z]*\.?(?:\s+(?:de\s+)?(\d{4}))?")
            .expect("month name pattern is valid")
    })
}

/// Classifies a site-native "posted" string relative to `today`
///
/// Returns `None` when the string cannot be understood.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use vaga_harvest::scoring::{classify_posted_at, RecencyBucket};
///
/// let today = NaiveDate::from_ymd_opt(2023, 5, 20).unwrap();
/// assert_eq!(classify_posted_at("hoje", today), Some(RecencyBucket::Day));
/// assert_eq!(classify_posted_at("há 3 dias", today), Some(RecencyBucket::Week));
/// assert_eq!(classify_posted_at("2023-04-01T10:00:00.000Z", today), Some(RecencyBucket::Older));
/// ```
pub fn classify_posted_at(text: &str, today: NaiveDate) -> Option<RecencyBucket> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }

    if text.contains("hoje") || text.contains("today") || text.contains("agora") {
        return Some(RecencyBucket::Day);
    }
    // A calendar age of one day, same as yesterday's printed date
    if text.contains("ontem") || text.contains("yesterday") {
        return Some(RecencyBucket::Week);
    }

    if let Some(caps) = iso_regex().captures(&text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(bucket_for_date(date, today));
    }

    if let Some(caps) = numeric_regex().captures(&text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = caps.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
        let date = resolve_date(day, month, year, today)?;
        return Some(bucket_for_date(date, today));
    }

    if let Some(caps) = relative_regex().captures(&text) {
        let amount: i64 = caps[1].parse().ok()?;
        let unit = &caps[2];
        let days = if unit.starts_with("min") || unit.starts_with('h') {
            // Minutes and hours only matter past the one-day boundary
            let hours = if unit.starts_with("min") {
                amount / 60
            } else {
                amount
            };
            if hours <= 24 {
                0
            } else {
                hours.saturating_add(23) / 24
            }
        } else if unit.starts_with('d') {
            amount
        } else if unit.starts_with("sem") || unit.starts_with('w') {
            amount.saturating_mul(7)
        } else {
            amount.saturating_mul(30)
        };
        return Some(RecencyBucket::from_age_days(days));
    }

    if let Some(caps) = month_name_regex().captures(&text) {
        let month = PT_MONTHS.iter().position(|m| *m == &caps[2])? as u32 + 1;
        let day: u32 = caps[1].parse().ok()?;
        let year = caps.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
        let date = resolve_date(day, month, year, today)?;
        return Some(bucket_for_date(date, today));
    }

    None
}

/// Builds a date, assuming the most recent past occurrence when the year is missing
fn resolve_date(day: u32, month: u32, year: Option<i32>, today: NaiveDate) -> Option<NaiveDate> {
    match year {
        Some(year) => {
            let year = if year < 100 { 2000 + year } else { year };
            NaiveDate::from_ymd_opt(year, month, day)
        }
        None => {
            let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
            if this_year > today {
                NaiveDate::from_ymd_opt(today.year() - 1, month, day)
            } else {
                Some(this_year)
            }
        }
    }
}

fn bucket_for_date(date: NaiveDate, today: NaiveDate) -> RecencyBucket {
    let age: Duration = today - date;
    RecencyBucket::from_age_days(age.num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 20).unwrap()
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(classify_posted_at("Hoje", today()), Some(RecencyBucket::Day));
        assert_eq!(classify_posted_at("Ontem", today()), Some(RecencyBucket::Week));
    }

    #[test]
    fn test_yesterday_matches_yesterdays_date() {
        assert_eq!(
            classify_posted_at("ontem", today()),
            classify_posted_at("2023-05-19", today())
        );
        assert_eq!(
            classify_posted_at("Posted yesterday", today()),
            Some(RecencyBucket::Week)
        );
    }

    #[test]
    fn test_huge_amounts_are_old_not_overflowing() {
        assert_eq!(
            classify_posted_at("há 999999999999999999 meses", today()),
            Some(RecencyBucket::Older)
        );
        assert_eq!(
            classify_posted_at("999999999999999999 weeks ago", today()),
            Some(RecencyBucket::Older)
        );
        assert_eq!(
            classify_posted_at("há 9223372036854775807 horas", today()),
            Some(RecencyBucket::Older)
        );
        // Too long for an i64 at all
        assert_eq!(
            classify_posted_at("há 99999999999999999999999 dias", today()),
            None
        );
    }

    #[test]
    fn test_relative_amounts() {
        assert_eq!(
            classify_posted_at("Publicada há 5 horas", today()),
            Some(RecencyBucket::Day)
        );
        assert_eq!(
            classify_posted_at("há 2 semanas", today()),
            Some(RecencyBucket::Month)
        );
        assert_eq!(
            classify_posted_at("Há 1 mês", today()),
            Some(RecencyBucket::Month)
        );
        assert_eq!(
            classify_posted_at("3 months ago", today()),
            Some(RecencyBucket::Older)
        );
        assert_eq!(
            classify_posted_at("30 minutos", today()),
            Some(RecencyBucket::Day)
        );
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(
            classify_posted_at("2023-05-20", today()),
            Some(RecencyBucket::Day)
        );
        assert_eq!(
            classify_posted_at("2023-05-15T08:00:00.000Z", today()),
            Some(RecencyBucket::Week)
        );
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(
            classify_posted_at("10/05/2023", today()),
            Some(RecencyBucket::Month)
        );
        assert_eq!(
            classify_posted_at("19/05/23", today()),
            Some(RecencyBucket::Week)
        );
        // No year and later than today in the calendar: last year's date
        assert_eq!(
            classify_posted_at("01/12", today()),
            Some(RecencyBucket::Older)
        );
    }

    #[test]
    fn test_portuguese_month_names() {
        assert_eq!(
            classify_posted_at("18 de mai", today()),
            Some(RecencyBucket::Week)
        );
        assert_eq!(
            classify_posted_at("2 fev", today()),
            Some(RecencyBucket::Older)
        );
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(classify_posted_at("", today()), None);
        assert_eq!(classify_posted_at("---", today()), None);
        assert_eq!(classify_posted_at("32/13/2023", today()), None);
    }

    #[test]
    fn test_bucket_ordering() {
        assert!(RecencyBucket::Day < RecencyBucket::Week);
        assert!(RecencyBucket::Month < RecencyBucket::Older);
        assert_eq!(RecencyBucket::Week.seconds(), 604_800);
    }
}
