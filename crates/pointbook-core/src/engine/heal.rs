//! Integrity Healer
//!
//! Repairs the staleness the engine tolerates. Every repair is persisted,
//! logged, and noted in a [`HealReport`]; repeating a repair is a no-op.

use serde::Serialize;
use tracing::{debug, warn};

use crate::category::{Category, CategoryId, CategoryStore};
use crate::error::Result;
use crate::member::MemberId;
use crate::record::PointRecord;
use crate::store::Datastore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrunedChild {
    pub parent: CategoryId,
    pub child: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealedRecord {
    pub member_id: MemberId,
    pub event_name: String,
}

/// Repairs made during one computation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealReport {
    /// Sub-category references to deleted categories
    pub pruned_children: Vec<PrunedChild>,
    /// Records whose event was deleted
    pub orphaned_records: Vec<HealedRecord>,
    /// Records with unset points written back as 0
    pub defaulted_records: Vec<HealedRecord>,
}

impl HealReport {
    pub fn is_clean(&self) -> bool {
        self.pruned_children.is_empty()
            && self.orphaned_records.is_empty()
            && self.defaulted_records.is_empty()
    }
}

pub(crate) fn prune_children<S: Datastore + ?Sized>(
    store: &mut S,
    category: &Category,
    report: &mut HealReport,
) -> Result<()> {
    let pruned = CategoryStore::new(store).prune_stale_children(category)?;
    report
        .pruned_children
        .extend(pruned.into_iter().map(|child| PrunedChild {
            parent: category.id.clone(),
            child,
        }));
    Ok(())
}

pub(crate) fn delete_orphan<S: Datastore + ?Sized>(
    store: &mut S,
    record: &PointRecord,
    report: &mut HealReport,
) -> Result<()> {
    warn!(
        member = %record.member_id,
        event = %record.event_name,
        "deleting point record for unknown event"
    );
    if store.delete_record(&record.member_id, &record.event_name)? {
        report.orphaned_records.push(HealedRecord {
            member_id: record.member_id.clone(),
            event_name: record.event_name.clone(),
        });
    }
    Ok(())
}

/// Points of a record; unset points count as 0 and are queued in `pending`
/// to be written back by [`write_defaults`]
pub(crate) fn default_points(
    record: &PointRecord,
    pending: &mut Vec<PointRecord>,
    report: &mut HealReport,
) -> f64 {
    if let Some(points) = record.points_earned {
        return points;
    }

    pending.push(record.clone().with_points(0.0));
    report.defaulted_records.push(HealedRecord {
        member_id: record.member_id.clone(),
        event_name: record.event_name.clone(),
    });
    0.0
}

/// Persist queued defaults in one batch
pub(crate) fn write_defaults<S: Datastore + ?Sized>(
    store: &mut S,
    pending: Vec<PointRecord>,
) -> Result<()> {
    if pending.is_empty() {
        return Ok(());
    }
    debug!(records = pending.len(), "writing defaulted points");
    store.put_records(pending)
}
