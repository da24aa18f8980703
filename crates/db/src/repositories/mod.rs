//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&dyn PersistenceGateway` as the first argument.

pub mod batch_repo;
pub mod course_repo;
pub mod enrollment_repo;
pub mod inquiry_repo;
pub mod institution_course_repo;
pub mod institution_repo;
pub mod pricing_tier_repo;
mod rows;
pub mod wizard_draft_repo;

pub use batch_repo::BatchRepo;
pub use course_repo::CourseRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use inquiry_repo::InquiryRepo;
pub use institution_course_repo::InstitutionCourseRepo;
pub use institution_repo::InstitutionRepo;
pub use pricing_tier_repo::PricingTierRepo;
pub use wizard_draft_repo::WizardDraftRepo;
