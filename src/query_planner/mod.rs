//! Query planning: lowering the declarative query model into a relational
//! logical plan.

pub mod errors;
pub mod logical_plan;
pub mod plan_builder;

pub use errors::PlanBuilderError;
pub use logical_plan::{
    Aggregate, AggregateExpr, ColumnShape, Comparison, FieldRef, Filter, Join, JoinKind, Limit,
    LogicalPlan, Project, RowShape, Scan, Sort,
};
pub use plan_builder::{build_plan, PlanBuilderResult};
