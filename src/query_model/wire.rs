//! Wire format of the query model.
//!
//! Queries arrive as JSON (or YAML parsed into the same shape):
//!
//! ```json
//! {
//!   "object": "Vehicle",
//!   "select": ["plate", "hasMedia.code"],
//!   "where": {"color": "blue"},
//!   "filter": [[">", "weight", 3.5], ["between", "year", 2018, 2022]],
//!   "links": [{"name": "hasMedia", "select": ["code"], "links": []}],
//!   "group_by": ["owner"],
//!   "metrics": [["sum", "hasTollRecords.amount", "total"]],
//!   "orderBy": [{"field": "plate", "direction": "ASC"}],
//!   "limit": 10,
//!   "offset": 5,
//!   "useCache": false
//! }
//! ```
//!
//! `from` is accepted as an alias for `object`. The legacy flat `where`
//! map is normalized into equality conditions on the same filter list the
//! richer `filter` array feeds, so both surfaces share one internal
//! representation downstream.

use serde::Deserialize;
use serde_json::Value;

use super::errors::QueryModelError;
use super::model::{
    AggregateFunction, AggregateSpec, FilterCondition, FilterOperator, LinkTraversal, OrderBySpec,
    QueryModel, SortDirection,
};

#[derive(Debug, Deserialize)]
struct WireQuery {
    #[serde(alias = "from")]
    object: String,
    #[serde(default)]
    select: Vec<String>,
    #[serde(default, rename = "where")]
    where_map: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    filter: Vec<Vec<Value>>,
    #[serde(default)]
    links: Vec<WireLink>,
    #[serde(default)]
    group_by: Vec<String>,
    #[serde(default)]
    metrics: Vec<Vec<Value>>,
    #[serde(default, rename = "orderBy", alias = "order_by")]
    order_by: Vec<WireOrderBy>,
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    offset: Option<i64>,
    #[serde(default, rename = "useCache", alias = "use_cache")]
    use_cache: bool,
}

#[derive(Debug, Deserialize)]
struct WireLink {
    name: String,
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    select: Vec<String>,
    #[serde(default)]
    filter: Vec<Vec<Value>>,
    #[serde(default)]
    links: Vec<WireLink>,
}

#[derive(Debug, Deserialize)]
struct WireOrderBy {
    field: String,
    #[serde(default)]
    direction: Option<String>,
}

impl QueryModel {
    pub fn from_json_value(value: Value) -> Result<Self, QueryModelError> {
        let wire: WireQuery =
            serde_json::from_value(value).map_err(|e| QueryModelError::Parse {
                message: e.to_string(),
            })?;
        wire.into_model()
    }

    pub fn from_json_str(json: &str) -> Result<Self, QueryModelError> {
        let value: Value = serde_json::from_str(json).map_err(|e| QueryModelError::Parse {
            message: e.to_string(),
        })?;
        Self::from_json_value(value)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, QueryModelError> {
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| QueryModelError::Parse {
            message: e.to_string(),
        })?;
        Self::from_json_value(value)
    }
}

impl WireQuery {
    fn into_model(self) -> Result<QueryModel, QueryModelError> {
        let mut filter = convert_conditions(self.filter)?;

        // Legacy flat equality map, appended after the richer filter list
        // in the caller's key order
        if let Some(where_map) = self.where_map {
            for (field, value) in where_map {
                filter.push(FilterCondition {
                    operator: FilterOperator::Eq,
                    field,
                    value,
                    value2: None,
                    lenient: true,
                });
            }
        }

        let links = self
            .links
            .into_iter()
            .map(WireLink::into_traversal)
            .collect::<Result<Vec<_>, _>>()?;

        let metrics = self
            .metrics
            .into_iter()
            .map(convert_metric)
            .collect::<Result<Vec<_>, _>>()?;

        let order_by = self
            .order_by
            .into_iter()
            .map(|item| {
                let direction = match item.direction {
                    Some(d) => SortDirection::parse(&d)?,
                    None => SortDirection::Asc,
                };
                Ok(OrderBySpec {
                    field: item.field,
                    direction,
                })
            })
            .collect::<Result<Vec<_>, QueryModelError>>()?;

        Ok(QueryModel {
            object: self.object,
            select: self.select,
            filter,
            links,
            group_by: self.group_by,
            metrics,
            order_by,
            limit: convert_paging("limit", self.limit)?,
            offset: convert_paging("offset", self.offset)?,
            use_cache: self.use_cache,
        })
    }
}

impl WireLink {
    fn into_traversal(self) -> Result<LinkTraversal, QueryModelError> {
        Ok(LinkTraversal {
            name: self.name,
            object: self.object,
            select: self.select,
            filter: convert_conditions(self.filter)?,
            links: self
                .links
                .into_iter()
                .map(WireLink::into_traversal)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

fn convert_paging(field: &str, value: Option<i64>) -> Result<Option<u64>, QueryModelError> {
    match value {
        None => Ok(None),
        Some(v) if v < 0 => Err(QueryModelError::NegativePaging {
            field: field.to_string(),
            value: v,
        }),
        Some(v) => Ok(Some(v as u64)),
    }
}

fn convert_conditions(tuples: Vec<Vec<Value>>) -> Result<Vec<FilterCondition>, QueryModelError> {
    tuples.into_iter().map(convert_condition).collect()
}

fn convert_condition(tuple: Vec<Value>) -> Result<FilterCondition, QueryModelError> {
    if tuple.len() < 3 {
        return Err(QueryModelError::FilterArity {
            detail: format!("expected [op, path, value, ...], got {} elements", tuple.len()),
        });
    }
    let mut tuple = tuple.into_iter();
    let operator = expect_string(tuple.next().unwrap(), "operator")?;
    let operator = FilterOperator::parse(&operator)?;
    let field = expect_string(tuple.next().unwrap(), "field path")?;
    let value = tuple.next().unwrap();
    let value2 = tuple.next();

    match operator {
        FilterOperator::Between => {
            // Accept either a fourth tuple element or a two-element array value
            let (value, value2) = match value2 {
                Some(v2) => (value, v2),
                None => match value {
                    Value::Array(bounds) if bounds.len() == 2 => {
                        let mut bounds = bounds.into_iter();
                        (bounds.next().unwrap(), bounds.next().unwrap())
                    }
                    _ => {
                        return Err(QueryModelError::FilterArity {
                            detail: format!("`between` on `{}` needs two bounds", field),
                        })
                    }
                },
            };
            Ok(FilterCondition {
                operator,
                field,
                value,
                value2: Some(value2),
                lenient: false,
            })
        }
        FilterOperator::In => {
            if !value.is_array() {
                return Err(QueryModelError::FilterArity {
                    detail: format!("`in` on `{}` needs an array of values", field),
                });
            }
            Ok(FilterCondition {
                operator,
                field,
                value,
                value2: None,
                lenient: false,
            })
        }
        _ => Ok(FilterCondition {
            operator,
            field,
            value,
            value2: None,
            lenient: false,
        }),
    }
}

fn convert_metric(tuple: Vec<Value>) -> Result<AggregateSpec, QueryModelError> {
    if tuple.len() < 2 || tuple.len() > 3 {
        return Err(QueryModelError::MetricArity {
            detail: format!("expected [fn, path, alias?], got {} elements", tuple.len()),
        });
    }
    let mut tuple = tuple.into_iter();
    let function = expect_string(tuple.next().unwrap(), "aggregate function")?;
    let function = AggregateFunction::parse(&function)?;
    let field = expect_string(tuple.next().unwrap(), "field path")?;
    let alias = match tuple.next() {
        Some(v) => Some(expect_string(v, "alias")?),
        None => None,
    };
    Ok(AggregateSpec {
        function,
        field,
        alias,
    })
}

fn expect_string(value: Value, what: &str) -> Result<String, QueryModelError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(QueryModelError::Parse {
            message: format!("expected a string for {}, got {}", what, other),
        }),
    }
}
