//! Record Aggregator

use std::collections::HashMap;

use tracing::{error, warn};

use crate::category::{CategoryId, CategoryStore};
use crate::error::{PointbookError, Result};
use crate::member::MemberId;
use crate::store::Datastore;

use super::heal::{default_points, delete_orphan, write_defaults, HealReport};

/// Received points per category id
pub type ReceivedMap = HashMap<CategoryId, f64>;

/// Sum the points a member received per category.
///
/// Each record is attributed to its event's category and rolled up into that
/// category's parent. Records of deleted events are removed and skipped. An
/// event whose category is gone aborts with [`PointbookError::Integrity`].
pub fn aggregate_received<S: Datastore + ?Sized>(
    store: &mut S,
    member_id: &MemberId,
    report: &mut HealReport,
) -> Result<ReceivedMap> {
    let mut received = ReceivedMap::new();
    let mut pending = Vec::new();

    for record in store.records_for_member(member_id)? {
        let Some(event) = store.event(&record.event_name)? else {
            delete_orphan(store, &record, report)?;
            continue;
        };

        let Some(category) = store.category(&event.category_id)? else {
            error!(
                event = %event.name,
                category = %event.category_id,
                "event references a deleted category"
            );
            return Err(PointbookError::Integrity {
                event: event.name,
                category_id: event.category_id.to_string(),
            });
        };

        let points = default_points(&record, &mut pending, report);
        *received.entry(category.id.clone()).or_insert(0.0) += points;

        if let Some(parent_id) = &category.parent_id {
            match CategoryStore::new(&mut *store).parent_of(&category)? {
                Some(parent) => *received.entry(parent.id).or_insert(0.0) += points,
                None => warn!(
                    category = %category.name,
                    parent = %parent_id,
                    "sub-category points not rolled up: parent is missing"
                ),
            }
        }
    }

    write_defaults(store, pending)?;
    Ok(received)
}
