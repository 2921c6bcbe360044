use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// A scheduled multi-week group course as listed by `/api/courses`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CourseOffering {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub level: String,
    /// Weeks.
    #[serde(rename = "total_length")]
    pub total_weeks: u32,
    #[serde(rename = "week_length")]
    pub hours_per_week: u32,
    #[serde(rename = "course_fee_per_hour")]
    pub fee_per_hour: f64,
    #[serde(rename = "start_dates", default)]
    #[schema(value_type = Vec<String>, example = json!(["2025-02-10T09:00:00"]))]
    pub start_slots: Vec<NaiveDateTime>,
}

impl CourseOffering {
    pub fn duration_hours(&self) -> u64 {
        u64::from(self.total_weeks) * u64::from(self.hours_per_week)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TutorOffering {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub work_experience: u32,
    #[serde(default)]
    pub languages_offered: Vec<String>,
    #[serde(default)]
    pub language_level: String,
    pub price_per_hour: f64,
}

/// Optional booking enhancements. Field names follow the order payload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AddOns {
    #[serde(default)]
    pub supplementary: bool,
    #[serde(default)]
    pub personalized: bool,
    #[serde(default)]
    pub excursions: bool,
    #[serde(default)]
    pub assessment: bool,
    #[serde(default)]
    pub interactive: bool,
}

/// Everything the price engine needs besides the catalog record.
///
/// `None` for date or time means the form is not filled in yet, and the
/// engine answers with an empty breakdown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingOptions {
    pub student_count: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration_hours: Option<u32>,
    pub add_ons: AddOns,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    BaseCost,
    WeekendSurcharge,
    MorningSurcharge,
    EveningSurcharge,
    Students,
    SupplementaryMaterials,
    PersonalizedSessions,
    CulturalExcursions,
    LevelAssessment,
    InteractivePlatform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub label: String,
    /// Rounded for display; the total is computed from unrounded values.
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PriceBreakdown {
    pub total_price: u64,
    pub line_items: Vec<LineItem>,
}

impl PriceBreakdown {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total_price == 0 && self.line_items.is_empty()
    }
}

/// Body sent to `POST /api/orders` and `PUT /api/orders/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct OrderPayload {
    #[serde(
        default,
        deserialize_with = "zero_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub course_id: Option<u64>,
    #[serde(
        default,
        deserialize_with = "zero_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub tutor_id: Option<u64>,
    #[schema(value_type = String, format = "date", example = "2025-02-10")]
    pub date_start: NaiveDate,
    #[serde(with = "hour_minute")]
    #[schema(value_type = String, example = "09:00")]
    pub time_start: NaiveTime,
    pub duration: u64,
    pub persons: u32,
    pub price: u64,
    #[serde(flatten)]
    pub add_ons: AddOns,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub student_id: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_datetime",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "2025-02-01T10:00:00")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub payload: OrderPayload,
}

/// The API writes `0` for the id that does not apply to an order.
fn zero_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(Option::<u64>::deserialize(deserializer)?.filter(|&id| id != 0))
}

/// Naive or RFC 3339 timestamps; anything else is dropped rather than
/// failing the whole order.
fn lenient_datetime<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(raw
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(&raw)
                .ok()
                .map(|dt| dt.naive_local())
        }))
}

/// `HH:MM` on the wire; the API also echoes `HH:MM:SS` back.
mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(D::Error::custom)
    }
}
