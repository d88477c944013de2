//! Generation plan contracts, validation and record-count propagation.

pub mod errors;
pub mod model;
pub mod propagate;
pub mod schema;
pub mod validate;

pub use errors::{PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{
    DEFAULT_RECORD_COUNT, DEFAULT_RECORDS_PER_PARENT, EntityConfig, GenerationPlan, OutputFormat,
    PLAN_VERSION, PropertyOverride,
};
pub use propagate::{apply_parents, compute_record_counts, scaffold_configs};
pub use schema::plan_json_schema;
pub use validate::{
    ValidatedPlan, validate_plan, validate_plan_against_entities, validate_plan_json,
};
