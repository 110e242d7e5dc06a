use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// First day of the synthetic request-date window.
pub fn window_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).expect("window start is a valid date")
}

/// Last day (inclusive) of the synthetic request-date window.
pub fn window_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).expect("window end is a valid date")
}

/// Uniform day in `[window_start(), window_end()]`.
pub fn draw_date<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    let span = (window_end() - window_start()).num_days();
    window_start() + Duration::days(rng.gen_range(0..=span))
}

/// Calendar attributes derived from one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub quarter: u32,
    pub weekday: &'static str,
    pub is_weekend: bool,
}

impl CalendarFields {
    pub fn of(date: NaiveDate) -> Self {
        let month = date.month();
        let weekday = date.weekday();
        Self {
            year: date.year(),
            month,
            month_name: MONTH_NAMES[date.month0() as usize],
            quarter: (month - 1) / 3 + 1,
            weekday: weekday_name(weekday),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn window_is_three_years() {
        assert_eq!((window_end() - window_start()).num_days(), 1095);
    }

    #[test]
    fn draws_stay_inside_window() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..5_000 {
            let d = draw_date(&mut rng);
            assert!(d >= window_start() && d <= window_end(), "{}", d);
        }
    }

    #[test]
    fn derives_calendar_fields() {
        let d = NaiveDate::from_ymd_opt(2024, 8, 17).unwrap();
        let c = CalendarFields::of(d);
        assert_eq!(c.year, 2024);
        assert_eq!(c.month, 8);
        assert_eq!(c.month_name, "August");
        assert_eq!(c.quarter, 3);
        assert_eq!(c.weekday, "Saturday");
        assert!(c.is_weekend);

        let c = CalendarFields::of(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!((c.quarter, c.weekday, c.is_weekend), (1, "Monday", false));

        let c = CalendarFields::of(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!((c.quarter, c.month_name, c.weekday), (4, "December", "Wednesday"));
    }
}
