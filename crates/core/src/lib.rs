pub mod batch;
pub mod course_catalog;
pub mod enrollment;
pub mod error;
pub mod gateway;
pub mod inquiry;
pub mod pricing;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
pub mod wizard;
