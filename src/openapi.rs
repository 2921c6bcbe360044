use utoipa::OpenApi;

use crate::booking::{BookingForm, BookingKind};
use crate::handlers::{CourseCard, OrderRow, QuoteResponse, RefreshResponse, SlotsResponse};
use crate::models::{
    AddOns, CourseOffering, LineItem, LineItemKind, Order, OrderPayload, PriceBreakdown,
    TutorOffering,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::list_courses,
        crate::handlers::get_course,
        crate::handlers::course_slots,
        crate::handlers::list_tutors,
        crate::handlers::get_tutor,
        crate::handlers::refresh_catalog,
        crate::handlers::quote,
        crate::handlers::list_orders,
        crate::handlers::get_order,
        crate::handlers::create_order,
        crate::handlers::update_order,
        crate::handlers::delete_order
    ),
    components(schemas(
        CourseOffering,
        TutorOffering,
        CourseCard,
        SlotsResponse,
        AddOns,
        BookingKind,
        BookingForm,
        LineItemKind,
        LineItem,
        PriceBreakdown,
        QuoteResponse,
        RefreshResponse,
        OrderPayload,
        Order,
        OrderRow
    )),
    tags(
        (name = "catalog", description = "Courses and tutors from the booking API"),
        (name = "booking", description = "Quotes and service health"),
        (name = "orders", description = "Orders proxied to the booking API")
    ),
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_quote_and_orders() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/quote"));
        assert!(doc.paths.paths.contains_key("/orders/{id}"));
    }
}
