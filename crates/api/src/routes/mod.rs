pub mod batch;
pub mod course;
pub mod enrollment;
pub mod health;
pub mod inquiry;
pub mod institution;
pub mod institution_course;
pub mod me;
pub mod pricing_tier;
pub mod wizard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /me                                              current user
///
/// /wizard-sessions                                 start a signup/edit wizard
/// /wizard-sessions/{id}                            view, abandon
/// /wizard-sessions/{id}/steps/{step}               hydrate, replace a step
/// /wizard-sessions/{id}/steps/{step}/fields/{f}    set one field
/// /wizard-sessions/{id}/course-categories/...      category and subject picks
/// /wizard-sessions/{id}/advance | go-back          navigation
/// /wizard-sessions/{id}/submit                     save the profile
///
/// /institutions                                    caller's profiles
/// /institutions/{id}                               profile
/// /institutions/{id}/steps/{step}                  single-step edit (PATCH)
///
/// /courses                                         unified listing, tutor CRUD
/// /institution-courses                             institution course CRUD
/// /batches                                         batch CRUD
/// /enrollments                                     enroll, list, status
/// /pricing-tiers                                   public list, admin CRUD
/// /inquiries                                       contact form, pipeline
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authenticated user profile.
        .nest("/me", me::router())
        // Signup wizard sessions.
        .nest("/wizard-sessions", wizard::router())
        // Saved institution profiles.
        .nest("/institutions", institution::router())
        // Course catalog.
        .nest("/courses", course::router())
        .nest("/institution-courses", institution_course::router())
        .nest("/batches", batch::router())
        .nest("/enrollments", enrollment::router())
        // Subscription plans.
        .nest("/pricing-tiers", pricing_tier::router())
        // Contact-form leads.
        .nest("/inquiries", inquiry::router())
}
