pub mod batch;
pub mod course;
pub mod enrollment;
pub mod inquiry;
pub mod institution;
pub mod institution_course;
pub mod me;
pub mod pricing_tier;
pub mod wizard;
