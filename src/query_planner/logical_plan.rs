//! Logical plan operators.
//!
//! A small closed set of relational operators built bottom-up per request.
//! Every node exposes a row shape (an ordered list of named, typed output
//! columns) and may only reference columns present in its input's shape,
//! by position. An object scan always places the id column first, then the
//! declared properties in schema order; that fixed layout is what keeps
//! positional lookup stable after joins shift columns right.

use serde_json::Value;
use std::sync::Arc;

use crate::ontology_catalog::PropertyType;
use crate::query_model::{AggregateFunction, FilterOperator, SortDirection};

/// One output column of a plan node.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnShape {
    /// Logical field label used for lookup ("plate", "hasMedia.code")
    pub field: String,
    /// Table alias owning the column in emitted SQL; empty for computed
    /// outputs (projection aliases, aggregate results) referenced by name
    pub table_alias: String,
    /// Logical column name within the owning table ("plate", "id",
    /// "source_id")
    pub column: String,
    pub data_type: PropertyType,
}

/// Ordered output columns of a plan node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowShape {
    pub columns: Vec<ColumnShape>,
}

impl RowShape {
    pub fn new(columns: Vec<ColumnShape>) -> Self {
        RowShape { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a field label. Later columns shadow earlier ones with the
    /// same label, so a traversal target's property wins over a link-table
    /// attribute of the same name, matching resolver preference.
    pub fn position_of(&self, field: &str) -> Option<usize> {
        self.columns.iter().rposition(|c| c.field == field)
    }

    /// Position by the unqualified leaf of the field label; used by sort
    /// resolution when a projection renamed a qualified field to its leaf
    pub fn position_of_leaf(&self, leaf: &str) -> Option<usize> {
        self.columns
            .iter()
            .rposition(|c| c.field == leaf || c.field.ends_with(&format!(".{}", leaf)))
    }

    pub fn concat(&self, other: &RowShape) -> RowShape {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        RowShape { columns }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Preserves unmatched left rows with nulls on the right side
    LeftOuter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogicalPlan {
    Scan(Scan),
    Filter(Filter),
    Join(Join),
    Project(Project),
    Aggregate(Aggregate),
    Sort(Sort),
    Limit(Limit),
}

/// Scan of one logical table: an object type or a link type's intermediate
/// table. The shape is fixed at build time from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    /// Logical table name (object or link type name)
    pub source: String,
    pub alias: String,
    pub shape: RowShape,
}

/// One comparison inside a filter conjunction, column resolved by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: FilterOperator,
    pub column: usize,
    pub value: Value,
    pub value2: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub input: Arc<LogicalPlan>,
    /// AND-ed comparisons
    pub predicate: Vec<Comparison>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: Arc<LogicalPlan>,
    pub right: Arc<LogicalPlan>,
    /// Key position in the left input's shape
    pub left_key: usize,
    /// Key position in the right input's shape
    pub right_key: usize,
    pub kind: JoinKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    /// Position in the input shape
    pub index: usize,
    /// Output column label
    pub output_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub input: Arc<LogicalPlan>,
    pub fields: Vec<FieldRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateExpr {
    pub function: AggregateFunction,
    /// Position in the input shape; `None` for `count(*)`
    pub column: Option<usize>,
    pub output_name: String,
}

/// Grouped aggregation. Output shape is the group keys followed by the
/// aggregate outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub input: Arc<LogicalPlan>,
    pub group_keys: Vec<usize>,
    pub aggregates: Vec<AggregateExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub input: Arc<LogicalPlan>,
    pub keys: Vec<(usize, SortDirection)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub input: Arc<LogicalPlan>,
    pub offset: u64,
    pub limit: u64,
}

impl LogicalPlan {
    /// Row shape this node produces, fully determined by its inputs and
    /// parameters.
    pub fn output_shape(&self) -> RowShape {
        match self {
            LogicalPlan::Scan(scan) => scan.shape.clone(),
            LogicalPlan::Filter(filter) => filter.input.output_shape(),
            LogicalPlan::Join(join) => join.left.output_shape().concat(&join.right.output_shape()),
            LogicalPlan::Project(project) => {
                let input = project.input.output_shape();
                RowShape::new(
                    project
                        .fields
                        .iter()
                        .map(|f| {
                            let source = &input.columns[f.index];
                            ColumnShape {
                                field: f.output_name.clone(),
                                table_alias: String::new(),
                                column: f.output_name.clone(),
                                data_type: source.data_type,
                            }
                        })
                        .collect(),
                )
            }
            LogicalPlan::Aggregate(aggregate) => {
                let input = aggregate.input.output_shape();
                let mut columns: Vec<ColumnShape> = aggregate
                    .group_keys
                    .iter()
                    .map(|&k| {
                        let source = &input.columns[k];
                        ColumnShape {
                            field: source.field.clone(),
                            table_alias: String::new(),
                            column: source.field.clone(),
                            data_type: source.data_type,
                        }
                    })
                    .collect();
                columns.extend(aggregate.aggregates.iter().map(|a| ColumnShape {
                    field: a.output_name.clone(),
                    table_alias: String::new(),
                    column: a.output_name.clone(),
                    data_type: PropertyType::Unknown,
                }));
                RowShape::new(columns)
            }
            LogicalPlan::Sort(sort) => sort.input.output_shape(),
            LogicalPlan::Limit(limit) => limit.input.output_shape(),
        }
    }
}
