//! Whole-query field path validation.
//!
//! Runs after wire parsing and before plan construction: every field path in
//! projection, filter, group-by, aggregate, and order-by must resolve against
//! the root object and the declared traversals, or the query is rejected.
//! The one exception is the legacy `where`-map conditions, which are marked
//! lenient and skipped with a warning when they no longer resolve.

use crate::ontology_catalog::field_path::{resolve, traversal_target, FieldPath};
use crate::ontology_catalog::{FieldPathError, ObjectType, OntologyCatalog};

use super::errors::QueryModelError;
use super::model::{AggregateFunction, FilterCondition, LinkTraversal, QueryModel};

/// Validate every field path in the query. `max_depth` bounds nested link
/// traversals (engine configuration, not a schema property).
pub fn validate(
    query: &QueryModel,
    catalog: &OntologyCatalog,
    max_depth: u32,
) -> Result<(), QueryModelError> {
    let root = catalog
        .object_type(&query.object)
        .ok_or_else(|| QueryModelError::UnknownObject {
            name: query.object.clone(),
        })?;

    validate_traversals(root, &query.links, catalog, 1, max_depth)?;

    for path in &query.select {
        resolve_path(path, root, &query.links, catalog)?;
    }

    validate_conditions(&query.filter, root, &query.links, catalog)?;

    for path in &query.group_by {
        resolve_path(path, root, &query.links, catalog)?;
    }

    for metric in &query.metrics {
        if metric.field == "*" {
            if metric.function != AggregateFunction::Count {
                return Err(QueryModelError::MetricArity {
                    detail: format!("`*` is only valid with count, not {}", metric.function.name()),
                });
            }
        } else {
            resolve_path(&metric.field, root, &query.links, catalog)?;
        }
    }

    for item in &query.order_by {
        resolve_path(&item.field, root, &query.links, catalog)?;
    }

    Ok(())
}

fn validate_traversals(
    root: &ObjectType,
    traversals: &[LinkTraversal],
    catalog: &OntologyCatalog,
    depth: u32,
    max_depth: u32,
) -> Result<(), QueryModelError> {
    if traversals.is_empty() {
        return Ok(());
    }
    if depth > max_depth {
        return Err(QueryModelError::TraversalDepthExceeded { max: max_depth });
    }

    for traversal in traversals {
        let link =
            catalog
                .link_type(&traversal.name)
                .ok_or_else(|| FieldPathError::UnknownLink {
                    link: traversal.name.clone(),
                })?;
        let target_name = traversal_target(link, root)?;

        if let Some(declared) = &traversal.object {
            if declared != target_name {
                return Err(QueryModelError::TraversalTargetMismatch {
                    link: traversal.name.clone(),
                    declared: declared.clone(),
                    resolved: target_name.to_string(),
                });
            }
        }

        // Endpoint existence was checked at catalog load
        let target = catalog.object_type(target_name).ok_or_else(|| {
            FieldPathError::DisconnectedLink {
                link: traversal.name.clone(),
                object: target_name.to_string(),
            }
        })?;

        for path in &traversal.select {
            resolve_traversal_field(path, link, target, &traversal.links, catalog)?;
        }
        for condition in &traversal.filter {
            resolve_traversal_field(&condition.field, link, target, &traversal.links, catalog)?;
        }

        validate_traversals(target, &traversal.links, catalog, depth + 1, max_depth)?;
    }
    Ok(())
}

/// Resolve a field declared inside a traversal body, relative to the
/// traversal's target object. Link-table attributes are accepted too.
fn resolve_traversal_field(
    path: &str,
    link: &crate::ontology_catalog::LinkType,
    target: &ObjectType,
    nested: &[LinkTraversal],
    catalog: &OntologyCatalog,
) -> Result<(), QueryModelError> {
    if path.contains('.') {
        resolve_path(path, target, nested, catalog)?;
        return Ok(());
    }
    if path == "id" || target.has_property(path) || link.property(path).is_some() {
        return Ok(());
    }
    Err(FieldPathError::UnknownField {
        object: target.name.clone(),
        property: path.to_string(),
    }
    .into())
}

fn validate_conditions(
    conditions: &[FilterCondition],
    root: &ObjectType,
    traversals: &[LinkTraversal],
    catalog: &OntologyCatalog,
) -> Result<(), QueryModelError> {
    for condition in conditions {
        match resolve_path(&condition.field, root, traversals, catalog) {
            Ok(_) => {}
            Err(_) if condition.lenient => {
                log::warn!(
                    "skipping legacy where condition on unresolvable field `{}`",
                    condition.field
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Resolve a possibly-deep dotted path against the declared traversal tree,
/// each hop re-rooted at the previous hop's target object.
pub fn resolve_path(
    path: &str,
    root: &ObjectType,
    traversals: &[LinkTraversal],
    catalog: &OntologyCatalog,
) -> Result<FieldPath, QueryModelError> {
    let segments: Vec<&str> = path.split('.').collect();
    let declared: Vec<String> = traversals.iter().map(|t| t.name.clone()).collect();

    if segments.len() <= 2 {
        return Ok(resolve(path, root, &declared, catalog)?);
    }

    // Walk intermediate hops; the final `link.property` pair goes through
    // the single-hop resolver for the full error taxonomy.
    let mut current = root;
    let mut available = traversals;
    for hop in &segments[..segments.len() - 2] {
        let traversal = available
            .iter()
            .find(|t| t.name == *hop)
            .ok_or_else(|| FieldPathError::UnknownTraversal {
                segment: hop.to_string(),
            })?;
        let link = catalog
            .link_type(*hop)
            .ok_or_else(|| FieldPathError::UnknownLink {
                link: hop.to_string(),
            })?;
        let target_name = traversal_target(link, current)?;
        current =
            catalog
                .object_type(target_name)
                .ok_or_else(|| FieldPathError::DisconnectedLink {
                    link: link.name.clone(),
                    object: target_name.to_string(),
                })?;
        available = &traversal.links;
    }

    let tail = format!(
        "{}.{}",
        segments[segments.len() - 2],
        segments[segments.len() - 1]
    );
    let declared: Vec<String> = available.iter().map(|t| t.name.clone()).collect();
    Ok(resolve(&tail, current, &declared, catalog)?)
}
