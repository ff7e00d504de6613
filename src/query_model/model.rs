use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::QueryModelError;

/// Comparison operators accepted in filter conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Between,
    In,
    Like,
}

impl FilterOperator {
    pub fn parse(symbol: &str) -> Result<Self, QueryModelError> {
        match symbol {
            "=" | "==" => Ok(FilterOperator::Eq),
            "!=" | "<>" => Ok(FilterOperator::Ne),
            ">" => Ok(FilterOperator::Gt),
            "<" => Ok(FilterOperator::Lt),
            ">=" => Ok(FilterOperator::Ge),
            "<=" => Ok(FilterOperator::Le),
            "between" => Ok(FilterOperator::Between),
            "in" => Ok(FilterOperator::In),
            "like" => Ok(FilterOperator::Like),
            other => Err(QueryModelError::InvalidOperator {
                operator: other.to_string(),
            }),
        }
    }

    /// SQL spelling of the operator (binary operators only; `between`,
    /// `in` and `like` render through dedicated templates)
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Ge => ">=",
            FilterOperator::Le => "<=",
            FilterOperator::Between => "BETWEEN",
            FilterOperator::In => "IN",
            FilterOperator::Like => "LIKE",
        }
    }
}

/// One `(operator, field path, value[, value2])` filter tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub operator: FilterOperator,
    pub field: String,
    pub value: Value,
    /// Upper bound for `between`, unused otherwise
    pub value2: Option<Value>,
    /// True for conditions normalized from the legacy flat `where` map.
    /// Lenient conditions whose field no longer resolves are skipped with a
    /// warning instead of failing the query.
    pub lenient: bool,
}

impl FilterCondition {
    pub fn equality(field: impl Into<String>, value: Value) -> Self {
        FilterCondition {
            operator: FilterOperator::Eq,
            field: field.into(),
            value,
            value2: None,
            lenient: false,
        }
    }
}

/// One declared link traversal with its nested projections, filters, and
/// further traversals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTraversal {
    /// Link type name
    pub name: String,
    /// Optional declared target object; checked against the resolved target
    pub object: Option<String>,
    pub select: Vec<String>,
    pub filter: Vec<FilterCondition>,
    pub links: Vec<LinkTraversal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    CountDistinct,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn parse(name: &str) -> Result<Self, QueryModelError> {
        match name {
            "sum" => Ok(AggregateFunction::Sum),
            "avg" => Ok(AggregateFunction::Avg),
            "count" => Ok(AggregateFunction::Count),
            "count_distinct" => Ok(AggregateFunction::CountDistinct),
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            other => Err(QueryModelError::InvalidAggregate {
                function: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Count => "count",
            AggregateFunction::CountDistinct => "count_distinct",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }
}

/// One `(function, field path, optional alias)` aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    pub function: AggregateFunction,
    /// Field path, or `*` (count only) meaning the root object's id
    pub field: String,
    pub alias: Option<String>,
}

impl AggregateSpec {
    /// Output column label: the alias when given, `fn_field` otherwise
    pub fn output_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => format!(
                "{}_{}",
                self.function.name(),
                self.field.replace('.', "_").replace('*', "all")
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(name: &str) -> Result<Self, QueryModelError> {
        match name.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            other => Err(QueryModelError::InvalidDirection {
                direction: other.to_string(),
            }),
        }
    }

    pub fn sql_keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBySpec {
    pub field: String,
    pub direction: SortDirection,
}

/// The declarative query: immutable once validated, the single structure
/// that flows through routing, planning, and SQL generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryModel {
    /// Root object type name
    pub object: String,
    pub select: Vec<String>,
    /// Normalized filter list; legacy `where` map entries are appended here
    /// with `lenient` set
    pub filter: Vec<FilterCondition>,
    pub links: Vec<LinkTraversal>,
    pub group_by: Vec<String>,
    pub metrics: Vec<AggregateSpec>,
    pub order_by: Vec<OrderBySpec>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Advisory caching hint from the caller; accepted but not enforced here
    pub use_cache: bool,
}

impl QueryModel {
    /// A bare scan of one object type; used as a starting point in tests
    /// and by consumers that assemble queries programmatically.
    pub fn for_object(object: impl Into<String>) -> Self {
        QueryModel {
            object: object.into(),
            select: Vec::new(),
            filter: Vec::new(),
            links: Vec::new(),
            group_by: Vec::new(),
            metrics: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            use_cache: false,
        }
    }

    pub fn is_aggregating(&self) -> bool {
        !self.metrics.is_empty() || !self.group_by.is_empty()
    }

    /// Link names declared at the root level, the set dotted field paths
    /// may traverse through
    pub fn declared_links(&self) -> Vec<String> {
        self.links.iter().map(|l| l.name.clone()).collect()
    }
}
