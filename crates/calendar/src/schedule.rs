//! Start-time resolution from raw extracted hints.
//!
//! Hints arrive lowercased and unnormalized ("next friday", "3pm"). This
//! module turns them into the concrete timestamp an [`crate::EventRequest`]
//! requires. Hints that cannot be interpreted resolve to `None` and the
//! caller skips the calendar action; that is an incomplete intent, not an
//! error.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

/// Resolve a start timestamp from optional date and time hints, relative
/// to `now`. With no date hint the event lands on today's date; with no
/// time hint it defaults to 09:00. Both hints absent means there is
/// nothing to schedule.
pub fn resolve_start_time(
    date_hint: Option<&str>,
    time_hint: Option<&str>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if date_hint.is_none() && time_hint.is_none() {
        return None;
    }

    let today = now.date_naive();
    let date = match date_hint {
        Some(hint) => resolve_date(hint.trim(), today)?,
        None => today,
    };
    let time = match time_hint {
        Some(hint) => resolve_time(hint.trim())?,
        None => NaiveTime::from_hms_opt(9, 0, 0)?,
    };

    Some(date.and_time(time).and_utc())
}

fn resolve_date(hint: &str, today: NaiveDate) -> Option<NaiveDate> {
    if hint == "today" {
        return Some(today);
    }
    if hint == "tomorrow" {
        return Some(today + Duration::days(1));
    }

    if let Some(rest) = hint.strip_prefix("next") {
        let word = rest.trim();
        if word == "week" {
            return Some(today + Duration::days(7));
        }
        let target = weekday_from_name(word)?;
        return Some(next_weekday(today, target));
    }

    month_day(hint, today)
}

/// Next occurrence of `target` strictly after `today`.
fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let ahead = (target.num_days_from_monday() + 7 - today.weekday().num_days_from_monday()) % 7;
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(i64::from(ahead))
}

/// `<month> <day>`: this year, or next year when the date already passed.
fn month_day(hint: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (month_word, day_word) = hint.split_once(' ')?;
    let month = month_from_name(month_word.trim())?;
    let day: u32 = day_word.trim().parse().ok()?;

    let this_year = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if this_year >= today {
        Some(this_year)
    } else {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    }
}

fn weekday_from_name(word: &str) -> Option<Weekday> {
    let weekday = match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn month_from_name(word: &str) -> Option<u32> {
    let month = match word {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// `H`, `H:MM`, optionally suffixed `am`/`pm` with or without a space.
fn resolve_time(hint: &str) -> Option<NaiveTime> {
    let (clock, meridiem) = if let Some(rest) = hint.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = hint.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (hint, None)
    };

    let (hour_word, minute_word) = match clock.split_once(':') {
        Some((hour, minute)) => (hour, Some(minute)),
        None => (clock, None),
    };

    let hour: u32 = hour_word.trim().parse().ok()?;
    let minute: u32 = match minute_word {
        Some(word) => word.trim().parse().ok()?,
        None => 0,
    };

    let hour = match meridiem {
        Some(Meridiem::Am) if hour == 12 => 0,
        Some(Meridiem::Am) => hour,
        Some(Meridiem::Pm) if hour == 12 => 12,
        Some(Meridiem::Pm) => hour.checked_add(12)?,
        None => hour,
    };

    if meridiem.is_some() && !(0..=23).contains(&hour) {
        return None;
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::resolve_start_time;

    // A Thursday.
    fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap()
    }

    #[test]
    fn next_weekday_lands_strictly_in_the_future() {
        let resolved = resolve_start_time(Some("next friday"), Some("3pm"), reference_now())
            .expect("hints resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 8, 7, 15, 0, 0).unwrap());

        // Same weekday as today rolls a full week forward.
        let resolved = resolve_start_time(Some("next thursday"), Some("3pm"), reference_now())
            .expect("hints resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 8, 13, 15, 0, 0).unwrap());
    }

    #[test]
    fn tomorrow_and_today_resolve_relative_to_now() {
        let tomorrow = resolve_start_time(Some("tomorrow"), Some("10:30 am"), reference_now())
            .expect("hints resolve");
        assert_eq!(tomorrow, Utc.with_ymd_and_hms(2026, 8, 7, 10, 30, 0).unwrap());

        let today =
            resolve_start_time(Some("today"), Some("11:15"), reference_now()).expect("resolves");
        assert_eq!(today, Utc.with_ymd_and_hms(2026, 8, 6, 11, 15, 0).unwrap());
    }

    #[test]
    fn month_day_before_today_rolls_to_next_year() {
        let resolved = resolve_start_time(Some("march 5"), Some("9am"), reference_now())
            .expect("hints resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2027, 3, 5, 9, 0, 0).unwrap());

        let resolved = resolve_start_time(Some("december 1"), None, reference_now())
            .expect("hints resolve");
        assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 12, 1, 9, 0, 0).unwrap());
    }

    #[test]
    fn missing_date_defaults_to_today_missing_time_to_morning() {
        let time_only =
            resolve_start_time(None, Some("4pm"), reference_now()).expect("time resolves");
        assert_eq!(time_only, Utc.with_ymd_and_hms(2026, 8, 6, 16, 0, 0).unwrap());

        let date_only =
            resolve_start_time(Some("tomorrow"), None, reference_now()).expect("date resolves");
        assert_eq!(date_only, Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap());
    }

    #[test]
    fn twelve_hour_edges_are_handled() {
        let noon = resolve_start_time(None, Some("12pm"), reference_now()).expect("resolves");
        assert_eq!(noon, Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap());

        let midnight = resolve_start_time(None, Some("12am"), reference_now()).expect("resolves");
        assert_eq!(midnight, Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap());
    }

    #[test]
    fn unresolvable_hints_yield_none() {
        assert!(resolve_start_time(None, None, reference_now()).is_none());
        assert!(resolve_start_time(Some("next fortnight"), Some("3pm"), reference_now()).is_none());
        assert!(resolve_start_time(Some("blorpuary 5"), None, reference_now()).is_none());
        assert!(resolve_start_time(None, Some("25:99"), reference_now()).is_none());
        assert!(resolve_start_time(None, Some("13pm"), reference_now()).is_none());
    }
}
