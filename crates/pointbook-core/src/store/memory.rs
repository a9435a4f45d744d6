use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::{normalize_name, Category, CategoryId};
use crate::error::Result;
use crate::event::Event;
use crate::member::{Member, MemberId};
use crate::record::PointRecord;

use super::Datastore;

/// In-memory arena of all entities
///
/// Events are keyed by normalized name. Records are kept in insertion order
/// and addressed by (member id, normalized event name).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    categories: BTreeMap<CategoryId, Category>,
    #[serde(default)]
    members: BTreeMap<MemberId, Member>,
    #[serde(default)]
    events: BTreeMap<String, Event>,
    #[serde(default)]
    records: Vec<PointRecord>,
}

impl MemoryStore {
    fn record_position(&self, member: &MemberId, event_name: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| &r.member_id == member && r.matches_event(event_name))
    }
}

impl Datastore for MemoryStore {
    fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        Ok(self.categories.get(id).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.values().cloned().collect())
    }

    fn put_category(&mut self, category: Category) -> Result<()> {
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    fn delete_category(&mut self, id: &CategoryId) -> Result<bool> {
        Ok(self.categories.remove(id).is_some())
    }

    fn member(&self, id: &MemberId) -> Result<Option<Member>> {
        Ok(self.members.get(id).cloned())
    }

    fn members(&self) -> Result<Vec<Member>> {
        Ok(self.members.values().cloned().collect())
    }

    fn put_member(&mut self, member: Member) -> Result<()> {
        self.members.insert(member.id.clone(), member);
        Ok(())
    }

    fn event(&self, name: &str) -> Result<Option<Event>> {
        Ok(self.events.get(&normalize_name(name)).cloned())
    }

    fn events(&self) -> Result<Vec<Event>> {
        Ok(self.events.values().cloned().collect())
    }

    fn put_event(&mut self, event: Event) -> Result<()> {
        self.events.insert(event.normalized_name(), event);
        Ok(())
    }

    fn delete_event(&mut self, name: &str) -> Result<bool> {
        Ok(self.events.remove(&normalize_name(name)).is_some())
    }

    fn records(&self) -> Result<Vec<PointRecord>> {
        Ok(self.records.clone())
    }

    fn put_record(&mut self, record: PointRecord) -> Result<()> {
        match self.record_position(&record.member_id, &record.event_name) {
            Some(index) => self.records[index] = record,
            None => self.records.push(record),
        }
        Ok(())
    }

    fn delete_record(&mut self, member: &MemberId, event_name: &str) -> Result<bool> {
        match self.record_position(member, event_name) {
            Some(index) => {
                self.records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_put_record_replaces_same_pair() {
        let mut store = MemoryStore::default();
        let u1 = MemberId::from("u1");
        store
            .put_record(PointRecord::new(u1.clone(), "Spring Mixer"))
            .unwrap();
        store
            .put_record(PointRecord::new(u1.clone(), "springmixer").with_points(2.0))
            .unwrap();

        let records = store.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].points_earned, Some(2.0));
    }

    #[test]
    fn test_deletes_are_idempotent() {
        let mut store = MemoryStore::default();
        let u1 = MemberId::from("u1");
        store.put_record(PointRecord::new(u1.clone(), "Mixer")).unwrap();

        assert!(store.delete_record(&u1, "Mixer").unwrap());
        assert!(!store.delete_record(&u1, "Mixer").unwrap());
        assert!(!store
            .delete_category(&CategoryId::from_string("cat-missing"))
            .unwrap());
        assert!(!store.delete_event("Mixer").unwrap());
    }

    #[test]
    fn test_event_lookup_is_normalized() {
        let mut store = MemoryStore::default();
        let date = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        store
            .put_event(Event::new("Spring Mixer", date, CategoryId::new()))
            .unwrap();
        assert!(store.event("spring mixer").unwrap().is_some());
        assert!(store.event("SPRINGMIXER").unwrap().is_some());
    }
}
