//! Events
//!
//! Events are where points are earned. Each event belongs to exactly one
//! category; event names are unique after normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::category::{normalize_name, CategoryId, CategoryStore};
use crate::error::{PointbookError, Result};
use crate::record::{PointRecord, RecordBook};
use crate::store::Datastore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub date: NaiveDate,
    pub category_id: CategoryId,
}

impl Event {
    pub fn new(name: impl Into<String>, date: NaiveDate, category_id: CategoryId) -> Self {
        Self {
            name: name.into(),
            date,
            category_id,
        }
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

/// Changes applied by [`EventBook::update`]
#[derive(Debug, Clone, Default)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
}

/// An event joined with its category name
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    pub name: String,
    pub date: NaiveDate,
    pub category: String,
}

/// Event bookkeeping on top of a [`Datastore`]
pub struct EventBook<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Datastore + ?Sized> EventBook<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Create an event and backfill an empty record for every member
    pub fn create(&mut self, name: &str, date: NaiveDate, category: &str) -> Result<Event> {
        if self.store.event(name)?.is_some() {
            return Err(PointbookError::EventAlreadyExists {
                name: name.to_string(),
            });
        }

        let category = CategoryStore::new(&mut *self.store)
            .find_by_name(category)?
            .ok_or_else(|| PointbookError::CategoryNotFound {
                name: category.to_string(),
            })?;

        let event = Event::new(name, date, category.id);
        self.store.put_event(event.clone())?;

        let created = RecordBook::new(&mut *self.store).populate_for_event(&event.name)?;
        debug!(event = %event.name, records = created, "created event");

        Ok(event)
    }

    pub fn get(&self, name: &str) -> Result<Event> {
        self.store
            .event(name)?
            .ok_or_else(|| PointbookError::EventNotFound {
                name: name.to_string(),
            })
    }

    /// Rename, re-date or move an event; records follow a rename
    pub fn update(&mut self, name: &str, update: EventUpdate) -> Result<Event> {
        let mut event = self.get(name)?;

        if let Some(category) = &update.category {
            let category = CategoryStore::new(&mut *self.store)
                .find_by_name(category)?
                .ok_or_else(|| PointbookError::CategoryNotFound {
                    name: category.clone(),
                })?;
            event.category_id = category.id;
        }

        if let Some(date) = update.date {
            event.date = date;
        }

        if let Some(new_name) = update.name {
            let renamed = normalize_name(&new_name) != event.normalized_name();
            if renamed && self.store.event(&new_name)?.is_some() {
                return Err(PointbookError::EventAlreadyExists { name: new_name });
            }

            let old_name = std::mem::replace(&mut event.name, new_name);
            if renamed {
                self.store.delete_event(&old_name)?;
            }
            for record in self.store.records_for_event(&old_name)? {
                self.store.delete_record(&record.member_id, &record.event_name)?;
                self.store.put_record(PointRecord {
                    event_name: event.name.clone(),
                    ..record
                })?;
            }
        }

        self.store.put_event(event.clone())?;
        Ok(event)
    }

    /// Delete an event together with its records
    pub fn delete(&mut self, name: &str) -> Result<Event> {
        let event = self.get(name)?;
        for record in self.store.records_for_event(&event.name)? {
            self.store.delete_record(&record.member_id, &record.event_name)?;
        }
        self.store.delete_event(&event.name)?;
        Ok(event)
    }

    /// List events ordered by date
    ///
    /// With a category, events of that category and its sub-categories are
    /// returned.
    pub fn list(&mut self, category: Option<&str>) -> Result<Vec<EventView>> {
        let scope: Option<Vec<CategoryId>> = match category {
            None => None,
            Some(name) => {
                let mut categories = CategoryStore::new(&mut *self.store);
                let category =
                    categories
                        .find_by_name(name)?
                        .ok_or_else(|| PointbookError::CategoryNotFound {
                            name: name.to_string(),
                        })?;
                let mut ids = vec![category.id.clone()];
                ids.extend(categories.get_children(&category)?.into_iter().map(|c| c.id));
                Some(ids)
            }
        };

        let mut events: Vec<Event> = self
            .store
            .events()?
            .into_iter()
            .filter(|e| scope.as_ref().map_or(true, |ids| ids.contains(&e.category_id)))
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));

        let mut out = Vec::with_capacity(events.len());
        for event in events {
            let category = self.store.category(&event.category_id)?.ok_or_else(|| {
                PointbookError::Integrity {
                    event: event.name.clone(),
                    category_id: event.category_id.to_string(),
                }
            })?;
            out.push(EventView {
                name: event.name,
                date: event.date,
                category: category.name,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PointsEngine;
    use crate::member::{Member, MemberId, Tier};
    use crate::store::MemoryStore;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, m, d).unwrap()
    }

    fn setup() -> MemoryStore {
        let mut store = MemoryStore::default();
        let mut categories = CategoryStore::new(&mut store);
        categories.upsert("Sisterhood", None).unwrap();
        categories.upsert("Mixers", Some("Sisterhood")).unwrap();
        categories.upsert("Philanthropy", None).unwrap();
        store.put_member(Member::new("u1", Tier::Standard)).unwrap();
        store.put_member(Member::new("u2", Tier::Reduced)).unwrap();
        store
    }

    #[test]
    fn test_create_backfills_records() {
        let mut store = setup();
        EventBook::new(&mut store)
            .create("Spring Mixer", date(3, 1), "mixers")
            .unwrap();

        let records = store.records_for_event("springmixer").unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.points_earned.is_none()));
    }

    #[test]
    fn test_create_rejects_duplicates_and_unknown_category() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();

        let err = book.create("spring mixer", date(3, 2), "Mixers").unwrap_err();
        assert!(matches!(err, PointbookError::EventAlreadyExists { .. }));

        let err = book.create("Gala", date(3, 2), "Formal").unwrap_err();
        assert!(matches!(err, PointbookError::CategoryNotFound { .. }));
    }

    #[test]
    fn test_rename_carries_records() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();
        book.update(
            "Spring Mixer",
            EventUpdate {
                name: Some("Spring Social".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(store.event("Spring Mixer").unwrap().is_none());
        assert!(store.event("Spring Social").unwrap().is_some());
        let record = store
            .record(&MemberId::from("u1"), "Spring Social")
            .unwrap()
            .unwrap();
        assert_eq!(record.event_name, "Spring Social");
        assert!(store.records_for_event("Spring Mixer").unwrap().is_empty());
    }

    #[test]
    fn test_move_to_other_category_moves_received_points() {
        let mut store = setup();
        let u1 = MemberId::from("u1");
        EventBook::new(&mut store)
            .create("Spring Mixer", date(3, 1), "Mixers")
            .unwrap();
        RecordBook::new(&mut store)
            .set_points(&u1, "Spring Mixer", 2.0)
            .unwrap();

        let before = PointsEngine::new(&mut store).compute_points(&u1).unwrap();
        assert_eq!(before.get("Sisterhood").unwrap().received, 2.0);
        assert_eq!(before.get("Philanthropy").unwrap().received, 0.0);

        let moved = EventBook::new(&mut store)
            .update(
                "spring mixer",
                EventUpdate {
                    date: Some(date(5, 20)),
                    category: Some("philanthropy".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.name, "Spring Mixer");
        assert_eq!(moved.date, date(5, 20));

        let stored = store.event("Spring Mixer").unwrap().unwrap();
        assert_eq!(stored, moved);

        let after = PointsEngine::new(&mut store).compute_points(&u1).unwrap();
        assert_eq!(after.get("Philanthropy").unwrap().received, 2.0);
        assert_eq!(after.get("Sisterhood").unwrap().received, 0.0);
        let mixers = after.sub_category("Sisterhood", "Mixers").unwrap();
        assert_eq!(mixers.received, 0.0);
    }

    #[test]
    fn test_rename_onto_existing_event_changes_nothing() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        let mixer = book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();
        let car_wash = book.create("Car Wash", date(2, 1), "Philanthropy").unwrap();

        let err = book
            .update(
                "Spring Mixer",
                EventUpdate {
                    name: Some("car wash".into()),
                    date: Some(date(6, 1)),
                    category: Some("Philanthropy".into()),
                },
            )
            .unwrap_err();
        assert!(matches!(err, PointbookError::EventAlreadyExists { .. }));

        assert_eq!(store.event("Spring Mixer").unwrap().unwrap(), mixer);
        assert_eq!(store.event("Car Wash").unwrap().unwrap(), car_wash);
        assert_eq!(store.events().unwrap().len(), 2);
        assert_eq!(store.records_for_event("Spring Mixer").unwrap().len(), 2);
        assert_eq!(store.records_for_event("Car Wash").unwrap().len(), 2);
    }

    #[test]
    fn test_update_unknown_category_is_rejected() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        let mixer = book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();

        let err = book
            .update(
                "Spring Mixer",
                EventUpdate {
                    category: Some("Formal".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, PointbookError::CategoryNotFound { .. }));
        assert_eq!(store.event("Spring Mixer").unwrap().unwrap(), mixer);
    }

    #[test]
    fn test_delete_removes_records() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();
        book.delete("springmixer").unwrap();

        assert!(store.events().unwrap().is_empty());
        assert!(store.records().unwrap().is_empty());
    }

    #[test]
    fn test_list_by_category_includes_sub_categories() {
        let mut store = setup();
        let mut book = EventBook::new(&mut store);
        book.create("Movie Night", date(4, 1), "Sisterhood").unwrap();
        book.create("Spring Mixer", date(3, 1), "Mixers").unwrap();
        book.create("Car Wash", date(2, 1), "Philanthropy").unwrap();

        let events = book.list(Some("Sisterhood")).unwrap();
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Spring Mixer", "Movie Night"]);

        let all = book.list(None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Car Wash");
    }
}
