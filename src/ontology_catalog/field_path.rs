//! Dotted field path resolution.
//!
//! A path with no `.` is always a root-object property; `traversal.property`
//! crosses exactly one declared link. Deeper nesting is resolved hop by hop
//! by the query validator, each hop re-rooted at the previous hop's target
//! object, so a single `resolve` call never sees more than one dot.

use super::errors::FieldPathError;
use super::schema::{LinkType, ObjectType, PropertyType};
use super::OntologyCatalog;

/// Resolution result: the owning object type, the leaf property, and the
/// link used to reach it. A root property carries no link.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    /// Object type owning the property (the traversal target for link hops)
    pub object: String,
    pub property: String,
    pub data_type: PropertyType,
    /// Link crossed to reach the property, if any
    pub link: Option<String>,
    /// True when the property lives on the link's own table rather than on
    /// the target object (link-table attributes such as `linkedAt`)
    pub link_property: bool,
}

impl FieldPath {
    fn root(object: &ObjectType, property: &str, data_type: PropertyType) -> Self {
        FieldPath {
            object: object.name.clone(),
            property: property.to_string(),
            data_type,
            link: None,
            link_property: false,
        }
    }
}

/// Resolve `path` against `root`, given the link names declared as
/// traversals at this level of the query.
pub fn resolve(
    path: &str,
    root: &ObjectType,
    declared_links: &[String],
    catalog: &OntologyCatalog,
) -> Result<FieldPath, FieldPathError> {
    match path.split_once('.') {
        None => {
            if path == "id" {
                return Ok(FieldPath::root(root, "id", PropertyType::Unknown));
            }
            match root.property(path) {
                Some(property) => Ok(FieldPath::root(root, path, property.data_type)),
                None => Err(FieldPathError::UnknownField {
                    object: root.name.clone(),
                    property: path.to_string(),
                }),
            }
        }
        Some((traversal, property)) => {
            if !declared_links.iter().any(|l| l == traversal) {
                return Err(FieldPathError::UnknownTraversal {
                    segment: traversal.to_string(),
                });
            }
            let link = catalog
                .link_type(traversal)
                .ok_or_else(|| FieldPathError::UnknownLink {
                    link: traversal.to_string(),
                })?;
            let target = traversal_target(link, root)?;

            resolve_on_target(property, link, target, catalog)
        }
    }
}

/// Determine which side of `link` the traversal lands on, given the object
/// it is entered from. Directed links may only be entered from their source
/// side; undirected links from either, with the non-matching side becoming
/// the target.
pub fn traversal_target<'a>(
    link: &'a LinkType,
    from: &ObjectType,
) -> Result<&'a str, FieldPathError> {
    if link.from_object == from.name {
        Ok(&link.to_object)
    } else if link.to_object == from.name {
        if link.is_directed() {
            Err(FieldPathError::DirectionViolation {
                link: link.name.clone(),
                object: from.name.clone(),
            })
        } else {
            Ok(&link.from_object)
        }
    } else {
        Err(FieldPathError::DisconnectedLink {
            link: link.name.clone(),
            object: from.name.clone(),
        })
    }
}

fn resolve_on_target(
    property: &str,
    link: &LinkType,
    target_name: &str,
    catalog: &OntologyCatalog,
) -> Result<FieldPath, FieldPathError> {
    // The catalog validated endpoints at load time; a dangling target here
    // means the catalog was built by hand, report it as a disconnect.
    let target = catalog
        .object_type(target_name)
        .ok_or_else(|| FieldPathError::DisconnectedLink {
            link: link.name.clone(),
            object: target_name.to_string(),
        })?;

    if property == "id" {
        return Ok(FieldPath {
            object: target.name.clone(),
            property: "id".to_string(),
            data_type: PropertyType::Unknown,
            link: Some(link.name.clone()),
            link_property: false,
        });
    }
    if let Some(p) = target.property(property) {
        return Ok(FieldPath {
            object: target.name.clone(),
            property: property.to_string(),
            data_type: p.data_type,
            link: Some(link.name.clone()),
            link_property: false,
        });
    }
    // Link-table attributes resolve against the link's own properties
    if let Some(p) = link.property(property) {
        return Ok(FieldPath {
            object: target.name.clone(),
            property: property.to_string(),
            data_type: p.data_type,
            link: Some(link.name.clone()),
            link_property: true,
        });
    }
    Err(FieldPathError::UnknownField {
        object: target.name.clone(),
        property: property.to_string(),
    })
}
