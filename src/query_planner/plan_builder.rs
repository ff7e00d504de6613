//! Deterministic logical plan construction.
//!
//! `build_plan` converts a validated query model plus the ontology catalog
//! into a plan tree, in a fixed order: scan the root object, filter with
//! whatever conditions already resolve against the scan shape, append two
//! left-outer joins per link traversal (root ↔ link table, link table ↔
//! target), apply the remaining conditions, then project or aggregate, sort,
//! and limit. Join keys are looked up through each side's datasource
//! mapping-backed scan shape by column label, never by assuming positions.
//!
//! All state is local to one call: table aliases come from a per-build
//! counter and the catalog is threaded as an argument, so building the same
//! query twice yields structurally identical trees.

use std::collections::HashSet;
use std::sync::Arc;

use crate::ontology_catalog::field_path::traversal_target;
use crate::ontology_catalog::{LinkType, ObjectType, OntologyCatalog, PropertyType};
use crate::query_model::{FilterCondition, LinkTraversal, QueryModel};

use super::errors::PlanBuilderError;
use super::logical_plan::{
    Aggregate, AggregateExpr, ColumnShape, Comparison, FieldRef, Filter, Join, JoinKind, Limit,
    LogicalPlan, Project, RowShape, Scan, Sort,
};

pub type PlanBuilderResult<T> = Result<T, PlanBuilderError>;

pub fn build_plan(
    query: &QueryModel,
    catalog: &OntologyCatalog,
) -> PlanBuilderResult<LogicalPlan> {
    PlanBuilder::new(catalog).build(query)
}

/// A filter condition carried past the join stage because its field was not
/// yet reachable in the row shape.
struct PendingCondition {
    field: String,
    condition: FilterCondition,
}

struct PlanBuilder<'a> {
    catalog: &'a OntologyCatalog,
    alias_counter: u32,
    /// Projection labels requested by traversal bodies, in traversal order
    traversal_selects: Vec<String>,
    /// Conditions waiting for joins to introduce their fields
    pending: Vec<PendingCondition>,
}

impl<'a> PlanBuilder<'a> {
    fn new(catalog: &'a OntologyCatalog) -> Self {
        PlanBuilder {
            catalog,
            alias_counter: 0,
            traversal_selects: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn next_alias(&mut self) -> String {
        self.alias_counter += 1;
        format!("t{}", self.alias_counter)
    }

    fn build(&mut self, query: &QueryModel) -> PlanBuilderResult<LogicalPlan> {
        let root = self.catalog.object_type(&query.object).ok_or_else(|| {
            PlanBuilderError::UnknownObject {
                name: query.object.clone(),
            }
        })?;
        require_object_mapping(root)?;

        let alias = self.next_alias();
        let mut plan = LogicalPlan::Scan(self.scan_object(root, "", alias));

        // Conditions resolvable against the bare scan apply before the
        // joins; the rest wait until traversals widen the row shape.
        let shape = plan.output_shape();
        let mut early = Vec::new();
        for condition in &query.filter {
            match shape.position_of(&condition.field) {
                Some(column) => early.push(build_comparison(column, condition)),
                None => self.pending.push(PendingCondition {
                    field: condition.field.clone(),
                    condition: condition.clone(),
                }),
            }
        }
        if !early.is_empty() {
            plan = LogicalPlan::Filter(Filter {
                input: Arc::new(plan),
                predicate: early,
            });
        }

        plan = self.add_traversals(plan, root, "", &query.links)?;

        plan = self.apply_pending_filters(plan)?;

        if query.is_aggregating() {
            plan = self.apply_aggregation(plan, query)?;
        } else {
            plan = self.apply_projection(plan, query);
        }

        plan = self.apply_sort(plan, query)?;

        if let Some(limit) = query.limit {
            plan = LogicalPlan::Limit(Limit {
                input: Arc::new(plan),
                offset: query.offset.unwrap_or(0),
                limit,
            });
        } else if let Some(offset) = query.offset {
            log::warn!("ignoring offset {} given without a limit", offset);
        }

        Ok(plan)
    }

    fn add_traversals(
        &mut self,
        mut plan: LogicalPlan,
        parent: &ObjectType,
        parent_prefix: &str,
        traversals: &[LinkTraversal],
    ) -> PlanBuilderResult<LogicalPlan> {
        let mut seen: HashSet<&str> = HashSet::new();
        for traversal in traversals {
            if !seen.insert(traversal.name.as_str()) {
                log::debug!(
                    "skipping duplicate traversal `{}` under `{}`",
                    traversal.name,
                    parent.name
                );
                continue;
            }
            plan = self.add_traversal(plan, parent, parent_prefix, traversal)?;
        }
        Ok(plan)
    }

    /// Append the two left-outer joins for one traversal and recurse into
    /// its nested traversals.
    fn add_traversal(
        &mut self,
        plan: LogicalPlan,
        parent: &ObjectType,
        parent_prefix: &str,
        traversal: &LinkTraversal,
    ) -> PlanBuilderResult<LogicalPlan> {
        let link = self.catalog.link_type(&traversal.name).ok_or_else(|| {
            PlanBuilderError::UnknownLink {
                link: traversal.name.clone(),
            }
        })?;
        require_link_mapping(link)?;

        let target_name = traversal_target(link, parent)?;
        let target = self.catalog.object_type(target_name).ok_or_else(|| {
            PlanBuilderError::UnknownObject {
                name: target_name.to_string(),
            }
        })?;
        require_object_mapping(target)?;

        let path = qualify(parent_prefix, &traversal.name);

        // An undirected link entered from its target side joins through the
        // link table's columns in swapped roles
        let entered_from_source = link.from_object == parent.name;
        let (near_column, far_column) = if entered_from_source {
            ("source_id", "target_id")
        } else {
            ("target_id", "source_id")
        };

        let parent_id = qualify(parent_prefix, "id");
        let left_shape = plan.output_shape();
        let left_key = left_shape
            .position_of(&parent_id)
            .expect("parent scan always carries its id column");

        let link_alias = self.next_alias();
        let link_scan = self.scan_link(link, &path, link_alias);
        let right_key = link_scan
            .shape
            .position_of(&format!("{}.{}", path, near_column))
            .expect("link scan always carries both key columns");

        let plan = LogicalPlan::Join(Join {
            left: Arc::new(plan),
            right: Arc::new(LogicalPlan::Scan(link_scan)),
            left_key,
            right_key,
            kind: JoinKind::LeftOuter,
        });

        let combined = plan.output_shape();
        let left_key = combined
            .position_of(&format!("{}.{}", path, far_column))
            .expect("link scan columns are in the combined shape");

        let target_alias = self.next_alias();
        let target_scan = self.scan_object(target, &path, target_alias);
        let right_key = target_scan
            .shape
            .position_of(&format!("{}.id", path))
            .expect("object scan always places id first");

        let mut plan = LogicalPlan::Join(Join {
            left: Arc::new(plan),
            right: Arc::new(LogicalPlan::Scan(target_scan)),
            left_key,
            right_key,
            kind: JoinKind::LeftOuter,
        });

        for field in &traversal.select {
            self.traversal_selects.push(format!("{}.{}", path, field));
        }
        for condition in &traversal.filter {
            self.pending.push(PendingCondition {
                field: format!("{}.{}", path, condition.field),
                condition: condition.clone(),
            });
        }

        plan = self.add_traversals(plan, target, &path, &traversal.links)?;
        Ok(plan)
    }

    fn apply_pending_filters(&mut self, plan: LogicalPlan) -> PlanBuilderResult<LogicalPlan> {
        if self.pending.is_empty() {
            return Ok(plan);
        }
        let shape = plan.output_shape();
        let mut comparisons = Vec::new();
        for pending in self.pending.drain(..) {
            match shape.position_of(&pending.field) {
                Some(column) => comparisons.push(build_comparison(column, &pending.condition)),
                None if pending.condition.lenient => {
                    log::warn!(
                        "skipping legacy where condition on unresolvable field `{}`",
                        pending.field
                    );
                }
                None => {
                    return Err(PlanBuilderError::UnresolvedFilterField {
                        field: pending.field,
                    })
                }
            }
        }
        if comparisons.is_empty() {
            return Ok(plan);
        }
        Ok(LogicalPlan::Filter(Filter {
            input: Arc::new(plan),
            predicate: comparisons,
        }))
    }

    fn apply_projection(&mut self, plan: LogicalPlan, query: &QueryModel) -> LogicalPlan {
        let mut requested: Vec<String> = Vec::new();
        for field in query.select.iter().chain(self.traversal_selects.iter()) {
            if !requested.iter().any(|r| r == field) {
                requested.push(field.clone());
            }
        }
        if requested.is_empty() {
            return plan;
        }

        let shape = plan.output_shape();
        let mut resolved: Vec<(String, usize)> = Vec::new();
        for field in requested {
            match shape.position_of(&field) {
                Some(index) => resolved.push((field, index)),
                // Optional relationship projections are common; drop with a
                // diagnostic rather than aborting
                None => log::warn!("dropping unresolvable projection field `{}`", field),
            }
        }
        if resolved.is_empty() {
            return plan;
        }

        // Output labels shorten to the leaf property name unless that would
        // collide with another projected field
        let fields = resolved
            .iter()
            .map(|(field, index)| {
                let leaf = leaf_of(field);
                let collides = resolved
                    .iter()
                    .filter(|(other, _)| leaf_of(other) == leaf)
                    .count()
                    > 1;
                FieldRef {
                    index: *index,
                    output_name: if collides {
                        field.clone()
                    } else {
                        leaf.to_string()
                    },
                }
            })
            .collect();

        LogicalPlan::Project(Project {
            input: Arc::new(plan),
            fields,
        })
    }

    fn apply_aggregation(
        &mut self,
        plan: LogicalPlan,
        query: &QueryModel,
    ) -> PlanBuilderResult<LogicalPlan> {
        if !query.select.is_empty() {
            log::debug!("select list is ignored when group_by/metrics are present");
        }
        let shape = plan.output_shape();

        let mut group_keys = Vec::with_capacity(query.group_by.len());
        for field in &query.group_by {
            let index = shape.position_of(field).ok_or_else(|| {
                PlanBuilderError::UnresolvedGroupByField {
                    field: field.clone(),
                }
            })?;
            group_keys.push(index);
        }

        let mut aggregates = Vec::with_capacity(query.metrics.len());
        for metric in &query.metrics {
            let column = if metric.field == "*" {
                None
            } else {
                Some(shape.position_of(&metric.field).ok_or_else(|| {
                    PlanBuilderError::UnresolvedMetricField {
                        field: metric.field.clone(),
                    }
                })?)
            };
            aggregates.push(AggregateExpr {
                function: metric.function,
                column,
                output_name: metric.output_name(),
            });
        }

        Ok(LogicalPlan::Aggregate(Aggregate {
            input: Arc::new(plan),
            group_keys,
            aggregates,
        }))
    }

    fn apply_sort(
        &mut self,
        plan: LogicalPlan,
        query: &QueryModel,
    ) -> PlanBuilderResult<LogicalPlan> {
        if query.order_by.is_empty() {
            return Ok(plan);
        }
        let shape = plan.output_shape();
        let mut keys = Vec::with_capacity(query.order_by.len());
        for item in &query.order_by {
            // Exact label first; a projection may have shortened a qualified
            // field to its leaf name, so fall back to leaf matching
            let index = shape
                .position_of(&item.field)
                .or_else(|| shape.position_of_leaf(leaf_of(&item.field)))
                .ok_or_else(|| PlanBuilderError::UnresolvedSortField {
                    field: item.field.clone(),
                })?;
            keys.push((index, item.direction));
        }
        Ok(LogicalPlan::Sort(Sort {
            input: Arc::new(plan),
            keys,
        }))
    }

    /// Scan shape for an object type: id first, then properties in declared
    /// order, labels qualified by the traversal path that reached it.
    fn scan_object(&self, object: &ObjectType, prefix: &str, alias: String) -> Scan {
        let mut columns = vec![ColumnShape {
            field: qualify(prefix, "id"),
            table_alias: alias.clone(),
            column: "id".to_string(),
            data_type: PropertyType::Unknown,
        }];
        for property in &object.properties {
            columns.push(ColumnShape {
                field: qualify(prefix, &property.name),
                table_alias: alias.clone(),
                column: property.name.clone(),
                data_type: property.data_type,
            });
        }
        Scan {
            source: object.name.clone(),
            alias,
            shape: RowShape::new(columns),
        }
    }

    /// Scan shape for a link table: source id, target id, then any
    /// link-table attributes.
    fn scan_link(&self, link: &LinkType, path: &str, alias: String) -> Scan {
        let mut columns = vec![
            ColumnShape {
                field: format!("{}.source_id", path),
                table_alias: alias.clone(),
                column: "source_id".to_string(),
                data_type: PropertyType::Unknown,
            },
            ColumnShape {
                field: format!("{}.target_id", path),
                table_alias: alias.clone(),
                column: "target_id".to_string(),
                data_type: PropertyType::Unknown,
            },
        ];
        for property in &link.properties {
            columns.push(ColumnShape {
                field: format!("{}.{}", path, property.name),
                table_alias: alias.clone(),
                column: property.name.clone(),
                data_type: property.data_type,
            });
        }
        Scan {
            source: link.name.clone(),
            alias,
            shape: RowShape::new(columns),
        }
    }
}

fn build_comparison(column: usize, condition: &FilterCondition) -> Comparison {
    Comparison {
        operator: condition.operator,
        column,
        value: condition.value.clone(),
        value2: condition.value2.clone(),
    }
}

fn require_object_mapping(object: &ObjectType) -> PlanBuilderResult<()> {
    if object.datasource.is_none() {
        return Err(PlanBuilderError::MappingNotConfigured {
            type_name: object.name.clone(),
        });
    }
    Ok(())
}

fn require_link_mapping(link: &LinkType) -> PlanBuilderResult<()> {
    if link.datasource.is_none() {
        return Err(PlanBuilderError::MappingNotConfigured {
            type_name: link.name.clone(),
        });
    }
    Ok(())
}

fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn leaf_of(field: &str) -> &str {
    field.rsplit('.').next().unwrap_or(field)
}
