//! Price calculation for course and tutor bookings.
//!
//! Pure functions: no I/O, no shared state. The same inputs always give the
//! same [`PriceBreakdown`], which matters because the form quotes live and the
//! order is priced again at submission.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};

use crate::models::{
    AddOns, BookingOptions, CourseOffering, LineItem, LineItemKind, PriceBreakdown, TutorOffering,
};

pub const WEEKEND_MULTIPLIER: f64 = 1.5;
pub const MORNING_SURCHARGE: f64 = 400.0;
pub const EVENING_SURCHARGE: f64 = 1000.0;
pub const SUPPLEMENTARY_PER_STUDENT: f64 = 2000.0;
pub const COURSE_PERSONALIZED_PER_WEEK: f64 = 1500.0;
pub const TUTOR_PERSONALIZED_PER_HOUR: f64 = 500.0;
pub const EXCURSIONS_RATE: f64 = 0.25;
pub const ASSESSMENT_FEE: f64 = 300.0;
pub const INTERACTIVE_RATE: f64 = 0.5;

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 09:00 up to, not including, 12:00.
pub fn is_morning(time: NaiveTime) -> bool {
    (9..12).contains(&time.hour())
}

/// 18:00 up to, not including, 20:00.
pub fn is_evening(time: NaiveTime) -> bool {
    (18..20).contains(&time.hour())
}

fn weekend_multiplier(date: NaiveDate) -> f64 {
    if is_weekend(date) { WEEKEND_MULTIPLIER } else { 1.0 }
}

/// Half-up for the non-negative amounts the engine produces.
fn round_price(amount: f64) -> f64 {
    amount.round()
}

/// Running total plus the line items explaining how it was reached.
struct Ledger {
    running: f64,
    items: Vec<LineItem>,
}

impl Ledger {
    fn new() -> Self {
        Self {
            running: 0.0,
            items: Vec::new(),
        }
    }

    /// Records a line item without touching the running total.
    fn note(&mut self, kind: LineItemKind, label: &str, amount: f64, description: String) {
        if amount == 0.0 {
            return;
        }
        self.items.push(LineItem {
            kind,
            label: label.to_string(),
            amount: round_price(amount),
            description,
        });
    }

    fn add(&mut self, kind: LineItemKind, label: &str, amount: f64, description: String) {
        self.running += amount;
        self.note(kind, label, amount, description);
    }

    fn finish(self) -> PriceBreakdown {
        PriceBreakdown {
            total_price: round_price(self.running).max(0.0) as u64,
            line_items: self.items,
        }
    }
}

/// The personalization add-on is priced differently per booking kind.
struct Personalization {
    amount: f64,
    label: &'static str,
    description: String,
}

fn apply_add_ons(
    ledger: &mut Ledger,
    add_ons: &AddOns,
    students: u32,
    personalization: Personalization,
) {
    if add_ons.supplementary {
        ledger.add(
            LineItemKind::SupplementaryMaterials,
            "Дополнительные материалы",
            SUPPLEMENTARY_PER_STUDENT * f64::from(students),
            format!("+{SUPPLEMENTARY_PER_STUDENT} ₽ за каждого из {students} студентов"),
        );
    }
    if add_ons.personalized {
        ledger.add(
            LineItemKind::PersonalizedSessions,
            personalization.label,
            personalization.amount,
            personalization.description,
        );
    }
    if add_ons.excursions {
        let amount = ledger.running * EXCURSIONS_RATE;
        ledger.add(
            LineItemKind::CulturalExcursions,
            "Культурные экскурсии",
            amount,
            "+25% от общей стоимости".to_string(),
        );
    }
    if add_ons.assessment {
        ledger.add(
            LineItemKind::LevelAssessment,
            "Оценка уровня",
            ASSESSMENT_FEE,
            format!("+{ASSESSMENT_FEE} ₽ за предварительную оценку"),
        );
    }
    if add_ons.interactive {
        let amount = ledger.running * INTERACTIVE_RATE;
        ledger.add(
            LineItemKind::InteractivePlatform,
            "Доступ к онлайн-платформе",
            amount,
            "+50% от текущей стоимости".to_string(),
        );
    }
}

fn students_of(options: &BookingOptions) -> u32 {
    options.student_count.filter(|&n| n > 0).unwrap_or(1)
}

fn duration_of(options: &BookingOptions) -> u32 {
    options.duration_hours.filter(|&h| h > 0).unwrap_or(1)
}

/// Base cost, weekend and time surcharges, scaled by headcount.
///
/// `per_student` is the cost of one student as computed by the caller; the
/// items only explain it.
#[allow(clippy::too_many_arguments)]
fn note_base(
    ledger: &mut Ledger,
    base_label: &str,
    hours: u64,
    rate: f64,
    multiplier: f64,
    morning: f64,
    evening: f64,
    per_student: f64,
    students: u32,
) {
    let base = rate * hours as f64;
    ledger.note(
        LineItemKind::BaseCost,
        base_label,
        base,
        format!("{hours} ч × {rate} ₽/ч"),
    );
    ledger.note(
        LineItemKind::WeekendSurcharge,
        "Надбавка за выходные дни",
        base * (multiplier - 1.0),
        format!("{multiplier}x в субботу и воскресенье"),
    );
    ledger.note(
        LineItemKind::MorningSurcharge,
        "Доплата за утренние занятия",
        morning,
        "занятия с 9:00 до 12:00".to_string(),
    );
    ledger.note(
        LineItemKind::EveningSurcharge,
        "Доплата за вечерние занятия",
        evening,
        "занятия с 18:00 до 20:00".to_string(),
    );
    ledger.note(
        LineItemKind::Students,
        "Количество студентов",
        per_student * f64::from(students - 1),
        format!("{students} чел. × {} ₽", round_price(per_student)),
    );
    ledger.running = per_student * f64::from(students);
}

pub struct PriceEngine;

impl PriceEngine {
    /// Prices a group course. Duration comes from the course itself.
    pub fn price_course(course: &CourseOffering, options: &BookingOptions) -> PriceBreakdown {
        let (Some(date), Some(time)) = (options.start_date, options.start_time) else {
            return PriceBreakdown::empty();
        };

        let hours = course.duration_hours();
        let multiplier = weekend_multiplier(date);
        // Ranges cannot overlap, but both are checked on their own.
        let morning = if is_morning(time) { MORNING_SURCHARGE } else { 0.0 };
        let evening = if is_evening(time) { EVENING_SURCHARGE } else { 0.0 };
        let per_student = course.fee_per_hour * hours as f64 * multiplier + morning + evening;
        let students = students_of(options);

        let mut ledger = Ledger::new();
        note_base(
            &mut ledger,
            "Базовая стоимость",
            hours,
            course.fee_per_hour,
            multiplier,
            morning,
            evening,
            per_student,
            students,
        );

        let weeks = course.total_weeks;
        apply_add_ons(
            &mut ledger,
            &options.add_ons,
            students,
            Personalization {
                amount: COURSE_PERSONALIZED_PER_WEEK * f64::from(weeks),
                label: "Индивидуальные занятия",
                description: format!(
                    "+{COURSE_PERSONALIZED_PER_WEEK} ₽ за каждую из {weeks} недель"
                ),
            },
        );
        ledger.finish()
    }

    /// Prices hours with a tutor. Missing or zero duration counts as one hour.
    pub fn price_tutor_session(tutor: &TutorOffering, options: &BookingOptions) -> PriceBreakdown {
        let (Some(date), Some(time)) = (options.start_date, options.start_time) else {
            return PriceBreakdown::empty();
        };

        let hours = duration_of(options);
        let multiplier = weekend_multiplier(date);
        let (morning, evening) = if is_morning(time) {
            (MORNING_SURCHARGE, 0.0)
        } else if is_evening(time) {
            (0.0, EVENING_SURCHARGE)
        } else {
            (0.0, 0.0)
        };
        let base_cost = tutor.price_per_hour * f64::from(hours) * multiplier;
        let per_student = base_cost + (morning + evening);
        let students = students_of(options);

        let mut ledger = Ledger::new();
        note_base(
            &mut ledger,
            "Почасовая ставка",
            u64::from(hours),
            tutor.price_per_hour,
            multiplier,
            morning,
            evening,
            per_student,
            students,
        );

        apply_add_ons(
            &mut ledger,
            &options.add_ons,
            students,
            Personalization {
                amount: TUTOR_PERSONALIZED_PER_HOUR * f64::from(hours),
                label: "Персонализация программы",
                description: format!("+{TUTOR_PERSONALIZED_PER_HOUR} ₽ за каждый из {hours} часов"),
            },
        );
        ledger.finish()
    }
}
