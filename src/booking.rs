//! The booking form: turns what the user picked into engine input, live
//! quotes and, on submission, a validated order payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::ToSchema;

use crate::catalog::CatalogStore;
use crate::format::times_for_date;
use crate::models::{AddOns, BookingOptions, CourseOffering, OrderPayload, PriceBreakdown, TutorOffering};
use crate::pricing::PriceEngine;
use crate::validation::{parse_start_date, parse_start_time, validate_duration, validate_persons};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingKind {
    Course,
    Tutor,
}

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Course {0} not found")]
    CourseNotFound(u64),
    #[error("Tutor {0} not found")]
    TutorNotFound(u64),
    #[error("{0}")]
    Invalid(String),
}

/// A catalog record the booking is placed against.
#[derive(Debug, Clone)]
pub enum BookingTarget {
    Course(CourseOffering),
    Tutor(TutorOffering),
}

impl BookingTarget {
    pub fn price(&self, options: &BookingOptions) -> PriceBreakdown {
        match self {
            BookingTarget::Course(course) => PriceEngine::price_course(course, options),
            BookingTarget::Tutor(tutor) => PriceEngine::price_tutor_session(tutor, options),
        }
    }
}

/// Form state as the UI submits it. Date and time stay raw strings so a
/// half-filled form still yields a (zero) quote instead of a parse error.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BookingForm {
    pub kind: BookingKind,
    pub target_id: u64,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub persons: Option<u32>,
    /// Session hours; ignored for course bookings.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(flatten)]
    pub add_ons: AddOns,
}

impl BookingForm {
    pub fn options(&self) -> BookingOptions {
        BookingOptions {
            student_count: self.persons,
            start_date: self.date_start.as_deref().and_then(parse_start_date),
            start_time: self.time_start.as_deref().and_then(parse_start_time),
            duration_hours: match self.kind {
                BookingKind::Course => None,
                BookingKind::Tutor => self.duration,
            },
            add_ons: self.add_ons,
        }
    }

    pub fn resolve(&self, catalog: &CatalogStore) -> Result<BookingTarget, BookingError> {
        match self.kind {
            BookingKind::Course => catalog
                .course(self.target_id)
                .map(BookingTarget::Course)
                .ok_or(BookingError::CourseNotFound(self.target_id)),
            BookingKind::Tutor => catalog
                .tutor(self.target_id)
                .map(BookingTarget::Tutor)
                .ok_or(BookingError::TutorNotFound(self.target_id)),
        }
    }

    pub fn quote(&self, catalog: &CatalogStore) -> Result<PriceBreakdown, BookingError> {
        Ok(self.resolve(catalog)?.price(&self.options()))
    }

    /// Validates the form and prices it again for the order payload.
    ///
    /// `today` is the first date a tutor session may be booked for.
    pub fn to_order(
        &self,
        catalog: &CatalogStore,
        today: NaiveDate,
    ) -> Result<OrderPayload, BookingError> {
        let target = self.resolve(catalog)?;
        let options = self.options();
        let (Some(date_start), Some(time_start)) = (options.start_date, options.start_time) else {
            return Err(BookingError::Invalid(
                "choose a start date and time".to_string(),
            ));
        };
        let persons = validate_persons(self.kind, self.persons.unwrap_or(1))?;

        let (course_id, tutor_id, duration) = match &target {
            BookingTarget::Course(course) => {
                let time = time_start.format("%H:%M").to_string();
                if !times_for_date(course, date_start).contains(&time) {
                    warn!(course_id = course.id, %date_start, %time, "start slot not offered");
                    return Err(BookingError::Invalid(format!(
                        "course {} does not start on {date_start} at {time}",
                        course.id
                    )));
                }
                (Some(course.id), None, course.duration_hours())
            }
            BookingTarget::Tutor(tutor) => {
                if date_start < today {
                    return Err(BookingError::Invalid(
                        "session date must not be in the past".to_string(),
                    ));
                }
                let hours = validate_duration(self.duration.unwrap_or(1))?;
                (None, Some(tutor.id), u64::from(hours))
            }
        };

        Ok(OrderPayload {
            course_id,
            tutor_id,
            date_start,
            time_start,
            duration,
            persons,
            price: target.price(&options).total_price,
            add_ons: self.add_ons,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, NaiveTime};

    use super::*;

    fn catalog() -> CatalogStore {
        let store = CatalogStore::new();
        store.replace(
            vec![CourseOffering {
                id: 1,
                name: "English B1".to_string(),
                description: String::new(),
                teacher: "Maria".to_string(),
                level: "Intermediate".to_string(),
                total_weeks: 4,
                hours_per_week: 10,
                fee_per_hour: 1000.0,
                start_slots: vec![
                    NaiveDateTime::parse_from_str("2025-03-01T09:30:00", "%Y-%m-%dT%H:%M:%S")
                        .unwrap(),
                    NaiveDateTime::parse_from_str("2025-03-04T14:00:00", "%Y-%m-%dT%H:%M:%S")
                        .unwrap(),
                ],
            }],
            vec![TutorOffering {
                id: 5,
                name: "Sergey".to_string(),
                work_experience: 10,
                languages_offered: vec!["English".to_string()],
                language_level: "Advanced".to_string(),
                price_per_hour: 1500.0,
            }],
        );
        store
    }

    fn course_form(date: &str, time: &str, persons: u32) -> BookingForm {
        BookingForm {
            kind: BookingKind::Course,
            target_id: 1,
            date_start: Some(date.to_string()),
            time_start: Some(time.to_string()),
            persons: Some(persons),
            duration: None,
            add_ons: AddOns::default(),
        }
    }

    fn tutor_form(date: &str, time: &str, hours: u32) -> BookingForm {
        BookingForm {
            kind: BookingKind::Tutor,
            target_id: 5,
            date_start: Some(date.to_string()),
            time_start: Some(time.to_string()),
            persons: Some(1),
            duration: Some(hours),
            add_ons: AddOns::default(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[test]
    fn test_quote_course() {
        let quote = course_form("2025-03-04", "14:00", 2).quote(&catalog()).unwrap();
        assert_eq!(quote.total_price, 80000);
    }

    #[test]
    fn test_quote_with_malformed_time_is_empty() {
        let quote = course_form("2025-03-04", "later", 2).quote(&catalog()).unwrap();
        assert!(quote.is_empty());
    }

    #[test]
    fn test_quote_unknown_target() {
        let mut form = course_form("2025-03-04", "14:00", 2);
        form.target_id = 42;
        assert!(matches!(
            form.quote(&catalog()),
            Err(BookingError::CourseNotFound(42))
        ));
    }

    #[test]
    fn test_course_duration_is_ignored_by_options() {
        let mut form = course_form("2025-03-04", "14:00", 1);
        form.duration = Some(3);
        assert_eq!(form.options().duration_hours, None);
    }

    #[test]
    fn test_course_order_matches_quote() {
        let mut form = course_form("2025-03-01", "09:30", 3);
        form.add_ons.excursions = true;
        form.add_ons.interactive = true;
        let catalog = catalog();
        let quote = form.quote(&catalog).unwrap();
        let order = form.to_order(&catalog, today()).unwrap();
        assert_eq!(order.price, quote.total_price);
        assert_eq!(order.course_id, Some(1));
        assert_eq!(order.tutor_id, None);
        assert_eq!(order.duration, 40);
        assert_eq!(order.persons, 3);
        assert_eq!(order.time_start, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_course_order_requires_offered_slot() {
        let err = course_form("2025-03-04", "09:30", 1)
            .to_order(&catalog(), today())
            .unwrap_err();
        assert!(matches!(err, BookingError::Invalid(_)));
    }

    #[test]
    fn test_order_requires_date_and_time() {
        let mut form = course_form("2025-03-04", "14:00", 1);
        form.date_start = None;
        assert!(matches!(
            form.to_order(&catalog(), today()),
            Err(BookingError::Invalid(_))
        ));
    }

    #[test]
    fn test_persons_limits_depend_on_kind() {
        assert!(course_form("2025-03-04", "14:00", 20).to_order(&catalog(), today()).is_ok());
        assert!(course_form("2025-03-04", "14:00", 21).to_order(&catalog(), today()).is_err());

        let mut form = tutor_form("2025-03-04", "19:00", 2);
        form.persons = Some(5);
        assert!(form.to_order(&catalog(), today()).is_ok());
        form.persons = Some(6);
        assert!(form.to_order(&catalog(), today()).is_err());
    }

    #[test]
    fn test_tutor_order() {
        let mut form = tutor_form("2025-03-04", "19:00", 5);
        form.add_ons.assessment = true;
        let order = form.to_order(&catalog(), today()).unwrap();
        assert_eq!(order.tutor_id, Some(5));
        assert_eq!(order.course_id, None);
        assert_eq!(order.duration, 5);
        assert_eq!(order.price, 8800);
        assert!(order.add_ons.assessment);
    }

    #[test]
    fn test_tutor_order_rejects_past_dates_and_long_sessions() {
        let past = tutor_form("2025-01-31", "12:00", 2).to_order(&catalog(), today());
        assert!(matches!(past, Err(BookingError::Invalid(_))));

        let long = tutor_form("2025-03-04", "12:00", 41).to_order(&catalog(), today());
        assert!(matches!(long, Err(BookingError::Invalid(_))));
    }
}
