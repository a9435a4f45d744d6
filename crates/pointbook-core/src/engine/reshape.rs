//! Hierarchy Reshaper

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryForest};
use crate::error::{PointbookError, Result};
use crate::store::Datastore;

use super::aggregate::ReceivedMap;
use super::heal::{prune_children, HealReport};
use super::requirement::RequiredMap;

/// Totals for a sub-category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategoryPoints {
    pub required: i64,
    pub received: f64,
    pub level: u8,
}

/// Totals for a root category and its sub-categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPoints {
    pub required: i64,
    pub received: f64,
    pub level: u8,
    pub sub_categories: BTreeMap<String, SubCategoryPoints>,
}

/// Points of one member keyed by root category name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HierarchyResult(BTreeMap<String, CategoryPoints>);

impl HierarchyResult {
    pub fn get(&self, root: &str) -> Option<&CategoryPoints> {
        self.0.get(root)
    }

    pub fn sub_category(&self, root: &str, child: &str) -> Option<&SubCategoryPoints> {
        self.0.get(root)?.sub_categories.get(child)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CategoryPoints)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn required_for(required: &RequiredMap, category: &Category) -> Result<i64> {
    required
        .get(&category.id)
        .copied()
        .ok_or_else(|| PointbookError::MissingComputation {
            category: category.name.clone(),
        })
}

/// Nest the flat maps under their root categories.
///
/// Stale sub-category references of every root are pruned on the way. A
/// category without a computed requirement is an internal error; a category
/// without received points simply received 0.
pub fn reshape<S: Datastore + ?Sized>(
    store: &mut S,
    forest: &CategoryForest,
    required: &RequiredMap,
    received: &ReceivedMap,
    report: &mut HealReport,
) -> Result<HierarchyResult> {
    let mut out = BTreeMap::new();

    for node in &forest.roots {
        prune_children(store, &node.category, report)?;

        let mut sub_categories = BTreeMap::new();
        for child in &node.children {
            sub_categories.insert(
                child.name.clone(),
                SubCategoryPoints {
                    required: required_for(required, child)?,
                    received: received.get(&child.id).copied().unwrap_or(0.0),
                    level: 2,
                },
            );
        }

        out.insert(
            node.category.name.clone(),
            CategoryPoints {
                required: required_for(required, &node.category)?,
                received: received.get(&node.category.id).copied().unwrap_or(0.0),
                level: 1,
                sub_categories,
            },
        );
    }

    Ok(HierarchyResult(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryNode;
    use crate::store::MemoryStore;

    #[test]
    fn test_missing_requirement_is_internal_error() {
        let mut store = MemoryStore::default();
        let forest = CategoryForest {
            roots: vec![CategoryNode {
                category: Category::new("Sisterhood"),
                children: Vec::new(),
            }],
        };

        let mut report = HealReport::default();
        let err = reshape(
            &mut store,
            &forest,
            &RequiredMap::new(),
            &ReceivedMap::new(),
            &mut report,
        )
        .unwrap_err();
        assert!(matches!(err, PointbookError::MissingComputation { .. }));
    }

    #[test]
    fn test_serializes_with_stable_field_names() {
        let root = Category::new("Sisterhood");
        let child = Category::new("Mixers");
        let mut required = RequiredMap::new();
        required.insert(root.id.clone(), 20);
        required.insert(child.id.clone(), 8);
        let mut received = ReceivedMap::new();
        received.insert(child.id.clone(), 2.0);
        let forest = CategoryForest {
            roots: vec![CategoryNode {
                category: root,
                children: vec![child],
            }],
        };

        let mut store = MemoryStore::default();
        let mut report = HealReport::default();
        let result = reshape(&mut store, &forest, &required, &received, &mut report).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Sisterhood": {
                    "required": 20,
                    "received": 0.0,
                    "level": 1,
                    "sub_categories": {
                        "Mixers": {"required": 8, "received": 2.0, "level": 2}
                    }
                }
            })
        );
    }
}
