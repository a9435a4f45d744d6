//! Point records
//!
//! A record is evidence that a member earned points at one event. There is
//! conceptually one record per (member, event) pair; a missing record counts
//! as zero points.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::category::normalize_name;
use crate::error::{PointbookError, Result};
use crate::member::MemberId;
use crate::store::Datastore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub member_id: MemberId,
    pub event_name: String,
    /// Unset until an officer enters points; read as 0
    #[serde(default)]
    pub points_earned: Option<f64>,
}

impl PointRecord {
    pub fn new(member_id: MemberId, event_name: impl Into<String>) -> Self {
        Self {
            member_id,
            event_name: event_name.into(),
            points_earned: None,
        }
    }

    pub fn with_points(mut self, points: f64) -> Self {
        self.points_earned = Some(points);
        self
    }

    pub fn points(&self) -> f64 {
        self.points_earned.unwrap_or(0.0)
    }

    pub fn matches_event(&self, event_name: &str) -> bool {
        normalize_name(&self.event_name) == normalize_name(event_name)
    }
}

/// Filter for [`RecordBook::list`]; `None` means all
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub member: Option<MemberId>,
    pub event: Option<String>,
}

/// A record joined with its event's category
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub member_id: MemberId,
    pub event_name: String,
    pub points_earned: f64,
    pub category: String,
}

/// Record bookkeeping on top of a [`Datastore`]
pub struct RecordBook<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Datastore + ?Sized> RecordBook<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Set the points a member earned at an event, creating the record if needed
    pub fn set_points(
        &mut self,
        member_id: &MemberId,
        event_name: &str,
        points: f64,
    ) -> Result<PointRecord> {
        if !points.is_finite() {
            return Err(PointbookError::InvalidPoints { value: points });
        }
        if self.store.member(member_id)?.is_none() {
            return Err(PointbookError::MemberNotFound {
                id: member_id.to_string(),
            });
        }
        let event = self
            .store
            .event(event_name)?
            .ok_or_else(|| PointbookError::EventNotFound {
                name: event_name.to_string(),
            })?;

        let record = PointRecord::new(member_id.clone(), event.name).with_points(points);
        self.store.put_record(record.clone())?;
        Ok(record)
    }

    /// List records sorted by member id
    ///
    /// Records whose event no longer exists are deleted while listing.
    pub fn list(&mut self, filter: &RecordFilter) -> Result<Vec<RecordView>> {
        let mut records: Vec<PointRecord> = self
            .store
            .records()?
            .into_iter()
            .filter(|r| filter.member.as_ref().map_or(true, |m| &r.member_id == m))
            .filter(|r| filter.event.as_deref().map_or(true, |e| r.matches_event(e)))
            .collect();
        records.sort_by(|a, b| {
            a.member_id
                .cmp(&b.member_id)
                .then_with(|| a.event_name.cmp(&b.event_name))
        });

        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let Some(event) = self.store.event(&record.event_name)? else {
                warn!(
                    member = %record.member_id,
                    event = %record.event_name,
                    "deleting point record for unknown event"
                );
                self.store
                    .delete_record(&record.member_id, &record.event_name)?;
                continue;
            };

            let category = self.store.category(&event.category_id)?.ok_or_else(|| {
                PointbookError::Integrity {
                    event: event.name.clone(),
                    category_id: event.category_id.to_string(),
                }
            })?;

            out.push(RecordView {
                points_earned: record.points(),
                member_id: record.member_id,
                event_name: record.event_name,
                category: category.name,
            });
        }

        Ok(out)
    }

    /// Create empty records for every member at this event
    pub fn populate_for_event(&mut self, event_name: &str) -> Result<usize> {
        let mut created = 0;
        for member in self.store.members()? {
            if self.store.record(&member.id, event_name)?.is_some() {
                continue;
            }
            self.store
                .put_record(PointRecord::new(member.id, event_name))?;
            created += 1;
        }
        Ok(created)
    }

    /// Create empty records for this member at every event
    pub fn populate_for_member(&mut self, member_id: &MemberId) -> Result<usize> {
        let mut created = 0;
        for event in self.store.events()? {
            if self.store.record(member_id, &event.name)?.is_some() {
                continue;
            }
            self.store
                .put_record(PointRecord::new(member_id.clone(), event.name))?;
            created += 1;
        }
        Ok(created)
    }
}
