// Content-plan domain: the incoming plan structure and the pure
// transformation into ordered document edit operations.

pub mod formatter;
pub mod plan_models;

pub use formatter::{format_plan, EditOperation, ParagraphStyle, PlanError};
pub use plan_models::{ContentPlan, Scene};
