//! Presentation helpers shared by the handlers: money in the ru-RU style,
//! start slot lookups and the pagination window.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::CourseOffering;

const GROUP_SEPARATOR: char = '\u{a0}';

/// `1234567.5` becomes `"1 234 567,5 ₽"` with non-breaking spaces.
pub fn format_rub(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(GROUP_SEPARATOR);
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative && cents > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        let fraction = format!("{fraction:02}");
        out.push(',');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push_str(" ₽");
    out
}

/// Earliest slot strictly after `now`. Slots are not assumed to be sorted.
pub fn nearest_start(slots: &[NaiveDateTime], now: NaiveDateTime) -> Option<NaiveDateTime> {
    slots.iter().copied().filter(|slot| *slot > now).min()
}

/// Distinct start dates in the order the API lists them.
pub fn start_dates(course: &CourseOffering) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = Vec::new();
    for slot in &course.start_slots {
        let date = slot.date();
        if !dates.contains(&date) {
            dates.push(date);
        }
    }
    dates
}

/// `HH:MM` start times offered on `date`, duplicates dropped.
pub fn times_for_date(course: &CourseOffering, date: NaiveDate) -> Vec<String> {
    let mut times: Vec<String> = Vec::new();
    for slot in course.start_slots.iter().filter(|slot| slot.date() == date) {
        let time = slot.format("%H:%M").to_string();
        if !times.contains(&time) {
            times.push(time);
        }
    }
    times
}

/// Page numbers for the pagination widget: the current page with two
/// neighbours each side, plus the first and last page. `None` is an ellipsis.
pub fn page_window(current: usize, total: usize) -> Vec<Option<usize>> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let start = current.saturating_sub(2).max(1);
    let end = (current + 2).min(total);

    let mut window = Vec::new();
    if start > 1 {
        window.push(Some(1));
        if start > 2 {
            window.push(None);
        }
    }
    window.extend((start..=end).map(Some));
    if end < total {
        if end < total - 1 {
            window.push(None);
        }
        window.push(Some(total));
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn course_with_slots(slots: &[&str]) -> CourseOffering {
        CourseOffering {
            id: 1,
            name: "German A1".to_string(),
            description: String::new(),
            teacher: String::new(),
            level: String::new(),
            total_weeks: 2,
            hours_per_week: 2,
            fee_per_hour: 100.0,
            start_slots: slots.iter().map(|s| slot(s)).collect(),
        }
    }

    #[test]
    fn test_format_rub() {
        assert_eq!(format_rub(0.0), "0 ₽");
        assert_eq!(format_rub(999.0), "999 ₽");
        assert_eq!(format_rub(80000.0), "80\u{a0}000 ₽");
        assert_eq!(format_rub(1234567.0), "1\u{a0}234\u{a0}567 ₽");
        assert_eq!(format_rub(1500.5), "1\u{a0}500,5 ₽");
        assert_eq!(format_rub(12.346), "12,35 ₽");
    }

    #[test]
    fn test_nearest_start_skips_past_and_unsorted() {
        let slots = vec![
            slot("2025-05-01T10:00:00"),
            slot("2025-03-01T10:00:00"),
            slot("2025-04-01T10:00:00"),
            slot("2025-01-01T10:00:00"),
        ];
        let now = slot("2025-02-15T00:00:00");
        assert_eq!(nearest_start(&slots, now), Some(slot("2025-03-01T10:00:00")));
        assert_eq!(nearest_start(&slots, slot("2026-01-01T00:00:00")), None);
    }

    #[test]
    fn test_dates_and_times() {
        let course = course_with_slots(&[
            "2025-02-10T09:00:00",
            "2025-02-10T18:00:00",
            "2025-02-17T09:00:00",
            "2025-02-10T09:00:00",
        ]);
        let monday = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        assert_eq!(
            start_dates(&course),
            vec![monday, NaiveDate::from_ymd_opt(2025, 2, 17).unwrap()]
        );
        assert_eq!(times_for_date(&course, monday), vec!["09:00", "18:00"]);
        assert!(
            times_for_date(&course, NaiveDate::from_ymd_opt(2025, 2, 11).unwrap()).is_empty()
        );
    }

    #[test]
    fn test_page_window() {
        assert!(page_window(1, 1).is_empty());
        assert_eq!(page_window(1, 3), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(
            page_window(1, 10),
            vec![Some(1), Some(2), Some(3), None, Some(10)]
        );
        assert_eq!(
            page_window(6, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), Some(7), Some(8), None, Some(10)]
        );
        assert_eq!(
            page_window(4, 6),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]
        );
    }
}
