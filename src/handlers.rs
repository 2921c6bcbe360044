use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, response::IntoResponse};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::{
    AppState,
    booking::BookingForm,
    catalog::{CatalogStore, Page, paginate},
    error::{ApiError, AppJson},
    format::{format_rub, nearest_start, start_dates, times_for_date},
    models::{CourseOffering, LineItem, Order, TutorOffering},
    validation::parse_start_date,
};

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default = "default_page")]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct TutorsQuery {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseCard {
    #[serde(flatten)]
    pub course: CourseOffering,
    #[schema(value_type = Option<String>, example = "2025-02-10T09:00:00")]
    pub nearest_start: Option<NaiveDateTime>,
    pub fee_display: String,
}

impl CourseCard {
    fn new(course: CourseOffering, now: NaiveDateTime) -> Self {
        Self {
            nearest_start: nearest_start(&course.start_slots, now),
            fee_display: format_rub(course.fee_per_hour),
            course,
        }
    }
}

/// An order as listed in the student's cabinet.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub target_name: String,
    pub price_display: String,
}

impl OrderRow {
    fn new(order: Order, catalog: &CatalogStore) -> Self {
        Self {
            target_name: catalog.target_name(&order.payload),
            price_display: format_rub(order.payload.price as f64),
            order,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SlotsResponse {
    #[schema(value_type = Vec<String>)]
    pub dates: Vec<NaiveDate>,
    /// Start times for the requested date, empty without `date`.
    pub times: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub total_price: u64,
    pub formatted_total: String,
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub courses: usize,
    pub tutors: usize,
}

/// Loads the catalog on first use so a cold start does not 404.
async fn ensure_catalog(state: &AppState) -> Result<(), ApiError> {
    if !state.catalog.is_loaded() {
        state.catalog.refresh(&state.api).await?;
    }
    Ok(())
}

fn local_now(state: &AppState) -> NaiveDateTime {
    Utc::now().with_timezone(&state.settings.tz()).naive_local()
}

#[utoipa::path(get, path = "/", tag = "booking")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Language school booking API",
        "endpoints": {
            "/courses": "Course catalog with search and pagination",
            "/tutors": "Tutors filtered by language and level",
            "/quote": "Price a booking form",
            "/orders": "Create, list, update and delete orders"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "booking")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/healthz/ready",
    responses(
        (status = 200, description = "Catalog loaded"),
        (status = 503, description = "Catalog not loaded yet")
    ),
    tag = "booking"
)]
pub async fn healthz_ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.catalog.is_loaded() {
        (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "loading"})),
        )
    }
}

#[utoipa::path(
    get,
    path = "/courses",
    params(
        ("search" = Option<String>, Query, description = "Matches name, level, description or teacher"),
        ("page" = Option<usize>, Query, description = "1-based page number")
    ),
    responses((status = 200, description = "Page of courses", body = Page<CourseCard>)),
    tag = "catalog"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CoursesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let now = local_now(&state);
    let cards: Vec<CourseCard> = state
        .catalog
        .search_courses(&query.search)
        .into_iter()
        .map(|course| CourseCard::new(course, now))
        .collect();
    Ok(Json(paginate(cards, query.page, state.settings.courses_per_page)))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = u64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course", body = CourseCard),
        (status = 404, description = "Unknown course")
    ),
    tag = "catalog"
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let course = state
        .catalog
        .course(id)
        .ok_or_else(|| ApiError::NotFound(format!("Course {id} not found")))?;
    Ok(Json(CourseCard::new(course, local_now(&state))))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/slots",
    params(
        ("id" = u64, Path, description = "Course id"),
        ("date" = Option<String>, Query, description = "YYYY-MM-DD to list start times for")
    ),
    responses(
        (status = 200, description = "Start dates and times", body = SlotsResponse),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "Unknown course")
    ),
    tag = "catalog"
)]
pub async fn course_slots(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let course = state
        .catalog
        .course(id)
        .ok_or_else(|| ApiError::NotFound(format!("Course {id} not found")))?;

    let times = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => {
            let date = parse_start_date(raw)
                .ok_or_else(|| ApiError::BadRequest("date must be YYYY-MM-DD".into()))?;
            times_for_date(&course, date)
        }
        None => Vec::new(),
    };
    Ok(Json(SlotsResponse {
        dates: start_dates(&course),
        times,
    }))
}

#[utoipa::path(
    get,
    path = "/tutors",
    params(
        ("language" = Option<String>, Query, description = "Language offered"),
        ("level" = Option<String>, Query, description = "Language level")
    ),
    responses((status = 200, description = "Tutors", body = [TutorOffering])),
    tag = "catalog"
)]
pub async fn list_tutors(
    State(state): State<AppState>,
    Query(query): Query<TutorsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    Ok(Json(
        state.catalog.filter_tutors(&query.language, &query.level),
    ))
}

#[utoipa::path(
    get,
    path = "/tutors/{id}",
    params(("id" = u64, Path, description = "Tutor id")),
    responses(
        (status = 200, description = "Tutor", body = TutorOffering),
        (status = 404, description = "Unknown tutor")
    ),
    tag = "catalog"
)]
pub async fn get_tutor(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let tutor = state
        .catalog
        .tutor(id)
        .ok_or_else(|| ApiError::NotFound(format!("Tutor {id} not found")))?;
    Ok(Json(tutor))
}

#[utoipa::path(
    post,
    path = "/catalog/refresh",
    responses(
        (status = 200, description = "Catalog reloaded", body = RefreshResponse),
        (status = 502, description = "Booking API failed")
    ),
    tag = "catalog"
)]
pub async fn refresh_catalog(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.catalog.refresh(&state.api).await?;
    Ok(Json(RefreshResponse {
        courses: state.catalog.courses().len(),
        tutors: state.catalog.tutors().len(),
    }))
}

#[utoipa::path(
    post,
    path = "/quote",
    request_body = BookingForm,
    responses(
        (status = 200, description = "Price breakdown", body = QuoteResponse),
        (status = 404, description = "Unknown course or tutor")
    ),
    tag = "booking"
)]
pub async fn quote(
    State(state): State<AppState>,
    AppJson(form): AppJson<BookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let breakdown = form.quote(&state.catalog)?;
    Ok(Json(QuoteResponse {
        total_price: breakdown.total_price,
        formatted_total: format_rub(breakdown.total_price as f64),
        line_items: breakdown.line_items,
    }))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(("page" = Option<usize>, Query, description = "1-based page number")),
    responses((status = 200, description = "Page of the API key owner's orders", body = Page<OrderRow>)),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let rows: Vec<OrderRow> = state
        .api
        .fetch_orders()
        .await?
        .into_iter()
        .map(|order| OrderRow::new(order, &state.catalog))
        .collect();
    Ok(Json(paginate(rows, query.page, state.settings.orders_per_page)))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderRow),
        (status = 404, description = "Unknown order")
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let order = state.api.fetch_order(id).await?;
    Ok(Json(OrderRow::new(order, &state.catalog)))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = BookingForm,
    responses(
        (status = 201, description = "Order created", body = Order),
        (status = 422, description = "Form rejected"),
        (status = 502, description = "Booking API failed")
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    AppJson(form): AppJson<BookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let payload = form
        .to_order(&state.catalog, state.settings.today())
        .inspect_err(|err| warn!(error = %err, "order form rejected"))?;
    let order = state.api.create_order(&payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    request_body = BookingForm,
    responses(
        (status = 200, description = "Order updated", body = Order),
        (status = 422, description = "Form rejected"),
        (status = 404, description = "Unknown order")
    ),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    AppJson(form): AppJson<BookingForm>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_catalog(&state).await?;
    let payload = form
        .to_order(&state.catalog, state.settings.today())
        .inspect_err(|err| warn!(order_id = id, error = %err, "order form rejected"))?;
    Ok(Json(state.api.update_order(id, &payload).await?))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Unknown order")
    ),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    state.api.delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
