//! Borsa Istanbul trading calendar.
//!
//! Regular sessions run Monday to Friday, 10:00-18:00 Istanbul time (UTC+3,
//! no daylight saving). Fixed national holidays close the market; religious
//! holidays are announced yearly and are not modelled.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Timelike, Utc, Weekday};

const UTC_OFFSET_HOURS: i64 = 3;
const OPEN_SECS: i64 = 10 * 3600;
const CLOSE_SECS: i64 = 18 * 3600;
const HALF_DAY_CLOSE_SECS: i64 = 13 * 3600;

/// Whether the exchange is trading, with a human-readable (Turkish) reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub is_open: bool,
    pub reason: String,
}

impl SessionStatus {
    fn open(reason: String) -> Self {
        Self {
            is_open: true,
            reason,
        }
    }

    fn closed(reason: String) -> Self {
        Self {
            is_open: false,
            reason,
        }
    }
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Pazartesi",
        Weekday::Tue => "Salı",
        Weekday::Wed => "Çarşamba",
        Weekday::Thu => "Perşembe",
        Weekday::Fri => "Cuma",
        Weekday::Sat => "Cumartesi",
        Weekday::Sun => "Pazar",
    }
}

/// Fixed-date holidays, plus the Monday after April 23 / May 19 when those
/// fall on a Sunday.
fn holiday(date: NaiveDate) -> Option<&'static str> {
    let fixed = match (date.month(), date.day()) {
        (1, 1) => Some("Yılbaşı"),
        (4, 23) => Some("Ulusal Egemenlik ve Çocuk Bayramı"),
        (5, 1) => Some("Emek ve Dayanışma Günü"),
        (5, 19) => Some("Atatürk'ü Anma, Gençlik ve Spor Bayramı"),
        (7, 15) => Some("Demokrasi ve Milli Birlik Günü"),
        (8, 30) => Some("Zafer Bayramı"),
        (10, 29) => Some("Cumhuriyet Bayramı"),
        _ => None,
    };
    if fixed.is_some() {
        return fixed;
    }
    let previous_was_sunday = || {
        date.pred_opt()
            .is_some_and(|d| d.weekday() == Weekday::Sun)
    };
    match (date.month(), date.day()) {
        (4, 24) if previous_was_sunday() => Some("23 Nisan'ın Pazartesi'ye kayması"),
        (5, 20) if previous_was_sunday() => Some("19 Mayıs'ın Pazartesi'ye kayması"),
        _ => None,
    }
}

fn half_day(date: NaiveDate) -> Option<&'static str> {
    (date.month() == 12 && date.day() == 31).then_some("Yılbaşı öncesi yarım gün")
}

/// `"Xs Ydk"`, or `"Ydk"` under an hour.
pub fn format_remaining(remaining: TimeDelta) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{hours}s {minutes}dk")
    } else {
        format!("{minutes}dk")
    }
}

fn clock(secs: i64) -> String {
    format!("{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Session state at `now`.
pub fn status(now: DateTime<Utc>) -> SessionStatus {
    let local = now.naive_utc() + TimeDelta::hours(UTC_OFFSET_HOURS);
    let date = local.date();
    let secs = i64::from(local.num_seconds_from_midnight());

    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return SessionStatus::closed(format!(
            "Hafta sonu - BIST kapalı (Bugün: {})",
            day_name(date.weekday())
        ));
    }
    if let Some(name) = holiday(date) {
        return SessionStatus::closed(format!("Resmi tatil - BIST kapalı ({name})"));
    }

    let (close, label) = match half_day(date) {
        Some(name) => (HALF_DAY_CLOSE_SECS, format!("Yarım gün işlem ({name}) - ")),
        None => (CLOSE_SECS, String::new()),
    };

    if secs < OPEN_SECS {
        SessionStatus::closed(format!(
            "{label}BIST henüz açılmadı - Açılış: {} (Kalan süre: {})",
            clock(OPEN_SECS),
            format_remaining(TimeDelta::seconds(OPEN_SECS - secs))
        ))
    } else if secs <= close {
        SessionStatus::open(format!(
            "{label}BIST açık - Kapanış: {} (Kalan süre: {})",
            clock(close),
            format_remaining(TimeDelta::seconds(close - secs))
        ))
    } else {
        SessionStatus::closed(format!(
            "{label}BIST kapandı - Sonraki açılış: {}",
            clock(OPEN_SECS)
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    /// Istanbul wall-clock time expressed in UTC.
    fn istanbul(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap() - TimeDelta::hours(3)
    }

    #[test]
    fn weekday_session_is_open() {
        // Monday
        let s = status(istanbul(2025, 3, 3, 12, 15));
        assert!(s.is_open);
        assert!(s.reason.contains("Kapanış: 18:00"));
        assert!(s.reason.contains("Kalan süre: 5s 45dk"));
    }

    #[test]
    fn before_open_shows_time_to_open() {
        let s = status(istanbul(2025, 3, 3, 9, 20));
        assert!(!s.is_open);
        assert!(s.reason.contains("Kalan süre: 40dk"));
    }

    #[test]
    fn session_bounds_are_inclusive() {
        assert!(status(istanbul(2025, 3, 3, 10, 0)).is_open);
        assert!(status(istanbul(2025, 3, 3, 18, 0)).is_open);
        let after = status(istanbul(2025, 3, 3, 18, 1));
        assert!(!after.is_open);
        assert!(after.reason.contains("kapandı"));
    }

    #[test]
    fn weekend_is_closed() {
        let s = status(istanbul(2025, 3, 8, 12, 0));
        assert!(!s.is_open);
        assert!(s.reason.contains("Cumartesi"));
    }

    #[test]
    fn fixed_holidays_are_closed() {
        // Monday, May 19 2025
        let s = status(istanbul(2025, 5, 19, 12, 0));
        assert!(!s.is_open);
        assert!(s.reason.contains("Resmi tatil"));
        assert!(!status(istanbul(2025, 10, 29, 11, 0)).is_open);
    }

    #[test]
    fn sunday_holiday_shifts_to_monday() {
        // April 23 2023 was a Sunday
        assert!(!status(istanbul(2023, 4, 24, 12, 0)).is_open);
        // April 23 2025 was a Wednesday, so the 24th trades normally
        assert!(status(istanbul(2025, 4, 24, 12, 0)).is_open);
    }

    #[test]
    fn new_years_eve_is_a_half_day() {
        let morning = status(istanbul(2025, 12, 31, 11, 0));
        assert!(morning.is_open);
        assert!(morning.reason.contains("Kapanış: 13:00"));
        assert!(!status(istanbul(2025, 12, 31, 14, 0)).is_open);
    }

    #[test]
    fn remaining_time_format() {
        assert_eq!(format_remaining(TimeDelta::minutes(125)), "2s 5dk");
        assert_eq!(format_remaining(TimeDelta::minutes(59)), "59dk");
        assert_eq!(format_remaining(TimeDelta::seconds(-5)), "0dk");
    }

    #[test]
    fn utc_midnight_crossing_uses_istanbul_date() {
        // 22:30 UTC Friday is 01:30 Saturday in Istanbul
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 22, 30, 0).unwrap();
        assert!(status(now).reason.contains("Hafta sonu"));
    }
}
