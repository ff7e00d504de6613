//! Logical plan to SQL conversion.
//!
//! Emits a single SELECT over *logical* identifiers: table names are object
//! and link type names, column names are property names, `id`, `source_id`,
//! and `target_id`. No physical name substitution happens here: on the
//! single-source path the connection's schema layer resolves logical names,
//! and on the federated path the generated views do.

use serde_json::Value;

use crate::query_model::FilterOperator;
use crate::query_planner::logical_plan::{ColumnShape, Comparison, LogicalPlan};

use super::dialect::Dialect;
use super::errors::SqlGeneratorError;
use super::function_registry::render_aggregate;
use super::sql_query::{JoinItem, OrderByItem, SelectItem, SqlQuery};

pub type SqlGeneratorResult<T> = Result<T, SqlGeneratorError>;

/// Render a logical plan as a dialect-correct SELECT statement.
pub fn plan_to_sql(plan: &LogicalPlan, dialect: Dialect) -> SqlGeneratorResult<String> {
    let query = build_query(plan, dialect)?;
    Ok(query.render(dialect))
}

/// Walk the plan top-down, filling in the statement parts. Each node
/// resolves its column references against its own input's shape.
fn build_query(plan: &LogicalPlan, dialect: Dialect) -> SqlGeneratorResult<SqlQuery> {
    let mut query = SqlQuery::default();
    collect(plan, &mut query, dialect)?;
    Ok(query)
}

fn collect(plan: &LogicalPlan, query: &mut SqlQuery, dialect: Dialect) -> SqlGeneratorResult<()> {
    match plan {
        LogicalPlan::Limit(limit) => {
            query.paging = Some((limit.offset, limit.limit));
            collect(&limit.input, query, dialect)
        }
        LogicalPlan::Sort(sort) => {
            let shape = sort.input.output_shape();
            for (index, direction) in &sort.keys {
                query.order_by.push(OrderByItem {
                    expression: column_expr(&shape.columns[*index], dialect),
                    direction: direction.sql_keyword(),
                });
            }
            collect(&sort.input, query, dialect)
        }
        LogicalPlan::Project(project) => {
            let shape = project.input.output_shape();
            for field in &project.fields {
                query.select.push(SelectItem {
                    expression: column_expr(&shape.columns[field.index], dialect),
                    alias: Some(field.output_name.clone()),
                });
            }
            collect(&project.input, query, dialect)
        }
        LogicalPlan::Aggregate(aggregate) => {
            let shape = aggregate.input.output_shape();
            for key in &aggregate.group_keys {
                let column = &shape.columns[*key];
                let expression = column_expr(column, dialect);
                query.group_by.push(expression.clone());
                query.select.push(SelectItem {
                    expression,
                    alias: Some(column.field.clone()),
                });
            }
            for aggregate_expr in &aggregate.aggregates {
                let arg = match aggregate_expr.column {
                    Some(index) => column_expr(&shape.columns[index], dialect),
                    None => "*".to_string(),
                };
                query.select.push(SelectItem {
                    expression: render_aggregate(aggregate_expr.function, &arg),
                    alias: Some(aggregate_expr.output_name.clone()),
                });
            }
            collect(&aggregate.input, query, dialect)
        }
        LogicalPlan::Filter(filter) => {
            let shape = filter.input.output_shape();
            for comparison in &filter.predicate {
                query
                    .filters
                    .push(render_comparison(comparison, &shape.columns, dialect)?);
            }
            collect(&filter.input, query, dialect)
        }
        LogicalPlan::Join(join) => {
            let right = match join.right.as_ref() {
                LogicalPlan::Scan(scan) => scan,
                other => {
                    return Err(SqlGeneratorError::UnsupportedPlanShape {
                        detail: format!("join right side must be a scan, got {:?}", other),
                    })
                }
            };
            let left_shape = join.left.output_shape();
            let left_column = &left_shape.columns[join.left_key];
            let right_column = &right.shape.columns[join.right_key];
            // Joins nest left-deep; reverse later so the FROM-adjacent join
            // comes first in the rendered statement
            query.joins.push(JoinItem {
                table: right.source.clone(),
                alias: right.alias.clone(),
                on_left: column_expr(left_column, dialect),
                on_right: column_expr(right_column, dialect),
            });
            collect(&join.left, query, dialect)?;
            if matches!(join.left.as_ref(), LogicalPlan::Scan(_) | LogicalPlan::Filter(_)) {
                query.joins.reverse();
            }
            Ok(())
        }
        LogicalPlan::Scan(scan) => {
            query.from_table = scan.source.clone();
            query.from_alias = scan.alias.clone();
            Ok(())
        }
    }
}

/// Qualified SQL expression for one shape column: `alias.column` for scan
/// columns, the (possibly quoted) output label for computed columns.
fn column_expr(column: &ColumnShape, dialect: Dialect) -> String {
    if column.table_alias.is_empty() {
        dialect.identifier(&column.field)
    } else {
        format!(
            "{}.{}",
            column.table_alias,
            dialect.identifier(&column.column)
        )
    }
}

fn render_comparison(
    comparison: &Comparison,
    columns: &[ColumnShape],
    dialect: Dialect,
) -> SqlGeneratorResult<String> {
    let column = column_expr(&columns[comparison.column], dialect);
    match comparison.operator {
        FilterOperator::Between => {
            let low = render_literal(&comparison.value, dialect)?;
            let high = match &comparison.value2 {
                Some(value) => render_literal(value, dialect)?,
                None => {
                    return Err(SqlGeneratorError::InvalidLiteral {
                        detail: "`between` comparison is missing its upper bound".to_string(),
                    })
                }
            };
            Ok(format!("({} BETWEEN {} AND {})", column, low, high))
        }
        FilterOperator::In => {
            let values = match &comparison.value {
                Value::Array(values) => values,
                other => {
                    return Err(SqlGeneratorError::InvalidLiteral {
                        detail: format!("`in` needs an array of values, got {}", other),
                    })
                }
            };
            if values.is_empty() {
                // IN () is invalid SQL; an empty list matches nothing
                return Ok("(1 = 0)".to_string());
            }
            let rendered: Result<Vec<String>, _> =
                values.iter().map(|v| render_literal(v, dialect)).collect();
            Ok(format!("({} IN ({}))", column, rendered?.join(", ")))
        }
        FilterOperator::Like => {
            let pattern = render_literal(&comparison.value, dialect)?;
            Ok(format!("({} LIKE {})", column, pattern))
        }
        operator => {
            let literal = render_literal(&comparison.value, dialect)?;
            Ok(format!("({} {} {})", column, operator.sql_symbol(), literal))
        }
    }
}

fn render_literal(value: &Value, dialect: Dialect) -> SqlGeneratorResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(match (dialect, b) {
            // T-SQL has no boolean literal
            (Dialect::SqlServer, true) => "1".to_string(),
            (Dialect::SqlServer, false) => "0".to_string(),
            (_, true) => "TRUE".to_string(),
            (_, false) => "FALSE".to_string(),
        }),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => dialect.encode_string_literal(s),
        other => Err(SqlGeneratorError::InvalidLiteral {
            detail: format!("cannot render {} as a scalar literal", other),
        }),
    }
}
