//! Collection of the object and link types one query touches, in
//! first-touch order: root object first, then per traversal the link and
//! its target, recursively.

use crate::ontology_catalog::field_path::traversal_target;
use crate::ontology_catalog::{LinkType, ObjectType, OntologyCatalog};
use crate::query_model::{LinkTraversal, QueryModel};
use crate::query_planner::PlanBuilderError;

use super::errors::ExecuteError;

pub(crate) struct TouchedTypes<'a> {
    pub objects: Vec<&'a ObjectType>,
    pub links: Vec<&'a LinkType>,
}

pub(crate) fn collect_touched<'a>(
    query: &QueryModel,
    catalog: &'a OntologyCatalog,
) -> Result<TouchedTypes<'a>, ExecuteError> {
    let root = catalog.object_type(&query.object).ok_or_else(|| {
        ExecuteError::Plan(PlanBuilderError::UnknownObject {
            name: query.object.clone(),
        })
    })?;

    let mut touched = TouchedTypes {
        objects: vec![root],
        links: Vec::new(),
    };
    walk(root, &query.links, catalog, &mut touched)?;
    Ok(touched)
}

fn walk<'a>(
    parent: &ObjectType,
    traversals: &[LinkTraversal],
    catalog: &'a OntologyCatalog,
    touched: &mut TouchedTypes<'a>,
) -> Result<(), ExecuteError> {
    for traversal in traversals {
        let link = catalog.link_type(&traversal.name).ok_or_else(|| {
            ExecuteError::Plan(PlanBuilderError::UnknownLink {
                link: traversal.name.clone(),
            })
        })?;
        if !touched.links.iter().any(|l| l.name == link.name) {
            touched.links.push(link);
        }

        let target_name =
            traversal_target(link, parent).map_err(|e| ExecuteError::Plan(e.into()))?;
        let target = catalog.object_type(target_name).ok_or_else(|| {
            ExecuteError::Plan(PlanBuilderError::UnknownObject {
                name: target_name.to_string(),
            })
        })?;
        if !touched.objects.iter().any(|o| o.name == target.name) {
            touched.objects.push(target);
        }

        walk(target, &traversal.links, catalog, touched)?;
    }
    Ok(())
}
