/// Aggregate Function Registry
///
/// Maps logical aggregate function names to their SQL renderings. All
/// supported dialects share these spellings, so the registry is not
/// dialect-keyed.
use std::collections::HashMap;

use crate::query_model::AggregateFunction;

/// Function mapping entry
#[derive(Clone)]
pub struct AggregateMapping {
    /// SQL function name
    pub sql_name: &'static str,
    /// Whether the argument is wrapped in DISTINCT
    pub distinct: bool,
}

/// Get the SQL mapping for a logical aggregate function
pub fn aggregate_mapping(function: AggregateFunction) -> &'static AggregateMapping {
    AGGREGATE_MAPPINGS
        .get(&function)
        .expect("registry covers every aggregate function")
}

/// Render an aggregate call over an already-rendered argument expression
pub fn render_aggregate(function: AggregateFunction, arg_sql: &str) -> String {
    let mapping = aggregate_mapping(function);
    if mapping.distinct {
        format!("{}(DISTINCT {})", mapping.sql_name, arg_sql)
    } else {
        format!("{}({})", mapping.sql_name, arg_sql)
    }
}

lazy_static::lazy_static! {
    static ref AGGREGATE_MAPPINGS: HashMap<AggregateFunction, AggregateMapping> = {
        let mut m = HashMap::new();
        m.insert(AggregateFunction::Sum, AggregateMapping { sql_name: "SUM", distinct: false });
        m.insert(AggregateFunction::Avg, AggregateMapping { sql_name: "AVG", distinct: false });
        m.insert(AggregateFunction::Count, AggregateMapping { sql_name: "COUNT", distinct: false });
        m.insert(AggregateFunction::CountDistinct, AggregateMapping { sql_name: "COUNT", distinct: true });
        m.insert(AggregateFunction::Min, AggregateMapping { sql_name: "MIN", distinct: false });
        m.insert(AggregateFunction::Max, AggregateMapping { sql_name: "MAX", distinct: false });
        m
    };
}
