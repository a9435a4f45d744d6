//! Requirement Calculator

use std::collections::HashMap;

use crate::category::{CategoryForest, CategoryId};
use crate::member::{requirement_override, tier_for, Member};

/// Required points per category id
pub type RequiredMap = HashMap<CategoryId, i64>;

/// Compute the points a member must earn in every category of the forest.
///
/// A root requires the larger of its own requirement and the sum of its
/// children's requirements. An exception replaces the requirement of the
/// category it names and nothing else: the children sum is always built from
/// the children's default requirements.
pub fn compute_required(member: &Member, forest: &CategoryForest) -> RequiredMap {
    let tier = tier_for(member);
    let mut required = RequiredMap::with_capacity(forest.len());

    for node in &forest.roots {
        let own = node.category.requirement_for(tier);
        let base = own.max(node.children_requirement(tier));
        let root_required =
            requirement_override(member, &node.category.name).unwrap_or(base);
        required.insert(node.category.id.clone(), root_required);

        for child in &node.children {
            let child_required = requirement_override(member, &child.name)
                .unwrap_or_else(|| child.requirement_for(tier));
            required.insert(child.id.clone(), child_required);
        }
    }

    required
}
