use std::sync::RwLock;

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::api::{ApiClientError, BookingApiClient};
use crate::format::page_window;
use crate::models::{CourseOffering, OrderPayload, TutorOffering};

const DELETED_COURSE: &str = "Курс удален";
const DELETED_TUTOR: &str = "Репетитор удален";
const UNKNOWN_TARGET: &str = "Неизвестно";

#[derive(Debug, Default)]
struct Snapshot {
    courses: Vec<CourseOffering>,
    tutors: Vec<TutorOffering>,
    loaded: bool,
}

/// Courses and tutors fetched from the booking API.
///
/// Owned by the application state and handed to whoever needs a lookup.
/// Readers get clones; [`CatalogStore::refresh`] swaps both lists at once.
#[derive(Debug, Default)]
pub struct CatalogStore {
    inner: RwLock<Snapshot>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads courses and tutors concurrently. On failure the previous
    /// snapshot stays in place.
    pub async fn refresh(&self, client: &BookingApiClient) -> Result<(), ApiClientError> {
        let result = futures::try_join!(client.fetch_courses(), client.fetch_tutors());
        match result {
            Ok((courses, tutors)) => {
                info!(
                    courses = courses.len(),
                    tutors = tutors.len(),
                    "catalog refreshed"
                );
                self.replace(courses, tutors);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "catalog refresh failed, keeping previous data");
                Err(err)
            }
        }
    }

    pub fn replace(&self, courses: Vec<CourseOffering>, tutors: Vec<TutorOffering>) {
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Snapshot {
            courses,
            tutors,
            loaded: true,
        };
    }

    fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    pub fn is_loaded(&self) -> bool {
        self.read(|s| s.loaded)
    }

    pub fn courses(&self) -> Vec<CourseOffering> {
        self.read(|s| s.courses.clone())
    }

    pub fn tutors(&self) -> Vec<TutorOffering> {
        self.read(|s| s.tutors.clone())
    }

    pub fn course(&self, id: u64) -> Option<CourseOffering> {
        self.read(|s| s.courses.iter().find(|c| c.id == id).cloned())
    }

    pub fn tutor(&self, id: u64) -> Option<TutorOffering> {
        self.read(|s| s.tutors.iter().find(|t| t.id == id).cloned())
    }

    /// Name of the course or tutor an order was placed for, with a
    /// placeholder when the record is gone from the catalog.
    pub fn target_name(&self, order: &OrderPayload) -> String {
        match (order.course_id, order.tutor_id) {
            (Some(id), _) => self
                .course(id)
                .map_or_else(|| DELETED_COURSE.to_string(), |course| course.name),
            (None, Some(id)) => self
                .tutor(id)
                .map_or_else(|| DELETED_TUTOR.to_string(), |tutor| tutor.name),
            (None, None) => UNKNOWN_TARGET.to_string(),
        }
    }

    /// Case-insensitive match on name, level, description and teacher.
    pub fn search_courses(&self, term: &str) -> Vec<CourseOffering> {
        let term = term.trim().to_lowercase();
        self.read(|s| {
            s.courses
                .iter()
                .filter(|c| {
                    term.is_empty()
                        || [&c.name, &c.level, &c.description, &c.teacher]
                            .iter()
                            .any(|field| field.to_lowercase().contains(&term))
                })
                .cloned()
                .collect()
        })
    }

    /// Empty filters match everything.
    pub fn filter_tutors(&self, language: &str, level: &str) -> Vec<TutorOffering> {
        let language = language.trim().to_lowercase();
        let level = level.trim().to_lowercase();
        self.read(|s| {
            s.tutors
                .iter()
                .filter(|t| {
                    language.is_empty()
                        || t.languages_offered
                            .iter()
                            .any(|lang| lang.to_lowercase().contains(&language))
                })
                .filter(|t| level.is_empty() || t.language_level.to_lowercase().contains(&level))
                .cloned()
                .collect()
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Page numbers to render; `null` marks an ellipsis.
    pub window: Vec<Option<usize>>,
}

/// 1-based pagination. Pages past the end clamp to the last page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));
    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
        window: page_window(page, total_pages),
    }
}
