//! Execution routing: single-source vs. federated.
//!
//! A query routes federated when the root object and the traversal target
//! objects span more than one distinct physical database. Metadata lookup
//! failures during routing never abort the request; the router degrades to
//! single-source and lets the executor, which has better context, raise the
//! authoritative error.

use crate::ontology_catalog::field_path::traversal_target;
use crate::ontology_catalog::{ObjectType, OntologyCatalog};
use crate::query_model::{LinkTraversal, QueryModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SingleSource,
    Federated,
}

pub fn route(query: &QueryModel, catalog: &OntologyCatalog) -> Route {
    let databases = match target_databases(query, catalog) {
        Ok(databases) => databases,
        Err(reason) => {
            log::warn!(
                "routing lookup failed ({}); degrading to single-source execution",
                reason
            );
            return Route::SingleSource;
        }
    };
    if databases.len() > 1 {
        Route::Federated
    } else {
        Route::SingleSource
    }
}

/// Distinct, non-empty database identifiers of the root object and every
/// traversal target, in first-touch order.
fn target_databases(
    query: &QueryModel,
    catalog: &OntologyCatalog,
) -> Result<Vec<String>, String> {
    let root = catalog
        .object_type(&query.object)
        .ok_or_else(|| format!("unknown object type `{}`", query.object))?;

    let mut databases = Vec::new();
    push_database(&mut databases, root);
    collect_traversal_databases(root, &query.links, catalog, &mut databases)?;
    Ok(databases)
}

fn collect_traversal_databases(
    parent: &ObjectType,
    traversals: &[LinkTraversal],
    catalog: &OntologyCatalog,
    databases: &mut Vec<String>,
) -> Result<(), String> {
    for traversal in traversals {
        let link = catalog
            .link_type(&traversal.name)
            .ok_or_else(|| format!("unknown link type `{}`", traversal.name))?;
        let target_name = traversal_target(link, parent).map_err(|e| e.to_string())?;
        let target = catalog
            .object_type(target_name)
            .ok_or_else(|| format!("unknown object type `{}`", target_name))?;
        push_database(databases, target);
        collect_traversal_databases(target, &traversal.links, catalog, databases)?;
    }
    Ok(())
}

fn push_database(databases: &mut Vec<String>, object: &ObjectType) {
    if let Some(mapping) = &object.datasource {
        if !mapping.database.is_empty() && !databases.iter().any(|d| d == &mapping.database) {
            databases.push(mapping.database.clone());
        }
    }
}
