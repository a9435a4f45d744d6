//! # Point Requirement & Aggregation Engine
//!
//! For one member, computes how many points each category requires and how
//! many the member has received, nested as root category → sub-categories.
//!
//! ## Pipeline
//!
//! 1. `requirement`: required points per category from the member's tier,
//!    the children's requirements and the member's exceptions
//! 2. `aggregate`: received points per category from the member's records,
//!    rolled up from sub-category to parent
//! 3. `reshape`: the flat maps nested under their roots
//!
//! Stale data found on the way is repaired by `heal` and reported. A missing
//! category behind an existing event is not repaired; it aborts with
//! [`PointbookError::Integrity`](crate::PointbookError::Integrity).
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pointbook_core::category::CategoryStore;
//! use pointbook_core::engine::PointsEngine;
//! use pointbook_core::event::EventBook;
//! use pointbook_core::member::{Member, MemberId, MemberRegistry, Tier};
//! use pointbook_core::record::RecordBook;
//! use pointbook_core::store::MemoryStore;
//!
//! let mut store = MemoryStore::default();
//!
//! let mut categories = CategoryStore::new(&mut store);
//! categories.upsert("Sisterhood", None).unwrap();
//! categories.upsert("Mixers", Some("Sisterhood")).unwrap();
//! categories.set_requirements("Sisterhood", Some(20), None).unwrap();
//! categories.set_requirements("Mixers", Some(8), None).unwrap();
//!
//! let date = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
//! EventBook::new(&mut store).create("Spring Mixer", date, "Mixers").unwrap();
//! MemberRegistry::new(&mut store)
//!     .register(Member::new("u1", Tier::Standard))
//!     .unwrap();
//! let u1 = MemberId::from("u1");
//! RecordBook::new(&mut store).set_points(&u1, "Spring Mixer", 2.0).unwrap();
//!
//! let points = PointsEngine::new(&mut store).compute_points(&u1).unwrap();
//! let sisterhood = points.get("Sisterhood").unwrap();
//! assert_eq!(sisterhood.required, 20);
//! assert_eq!(sisterhood.received, 2.0);
//! assert_eq!(sisterhood.sub_categories["Mixers"].required, 8);
//! ```

mod aggregate;
mod heal;
mod requirement;
mod reshape;

pub use aggregate::{aggregate_received, ReceivedMap};
pub use heal::{HealReport, HealedRecord, PrunedChild};
pub use requirement::{compute_required, RequiredMap};
pub use reshape::{reshape, CategoryPoints, HierarchyResult, SubCategoryPoints};

use serde::Serialize;
use tracing::debug;

use crate::access::AccessPolicy;
use crate::category::CategoryStore;
use crate::error::{PointbookError, Result};
use crate::member::MemberId;
use crate::store::Datastore;

/// Hierarchy together with the repairs made while computing it
#[derive(Debug, Clone, Serialize)]
pub struct PointsReport {
    pub points: HierarchyResult,
    pub healed: HealReport,
}

pub struct PointsEngine<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Datastore + ?Sized> PointsEngine<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Required and received points of a member per category
    pub fn compute_points(&mut self, member_id: &MemberId) -> Result<HierarchyResult> {
        Ok(self.compute_points_with_report(member_id)?.points)
    }

    pub fn compute_points_with_report(&mut self, member_id: &MemberId) -> Result<PointsReport> {
        let member = self
            .store
            .member(member_id)?
            .ok_or_else(|| PointbookError::MemberNotFound {
                id: member_id.to_string(),
            })?;

        let forest = CategoryStore::new(&mut *self.store).forest()?;
        let required = compute_required(&member, &forest);

        let mut healed = HealReport::default();
        let received = aggregate_received(&mut *self.store, &member.id, &mut healed)?;
        let points = reshape(&mut *self.store, &forest, &required, &received, &mut healed)?;

        debug!(
            member = %member.id,
            tier = %member.tier,
            categories = forest.len(),
            healed = !healed.is_clean(),
            "computed points"
        );

        Ok(PointsReport { points, healed })
    }

    /// [`compute_points`](Self::compute_points) after checking the caller may view `member_id`
    pub fn compute_points_as(
        &mut self,
        policy: &impl AccessPolicy,
        caller_id: &MemberId,
        member_id: &MemberId,
    ) -> Result<HierarchyResult> {
        let caller = self
            .store
            .member(caller_id)?
            .ok_or_else(|| PointbookError::MemberNotFound {
                id: caller_id.to_string(),
            })?;

        if !policy.can_view_points(&caller, member_id) {
            return Err(PointbookError::PermissionDenied {
                caller: caller_id.to_string(),
                target: member_id.to_string(),
            });
        }

        self.compute_points(member_id)
    }
}
