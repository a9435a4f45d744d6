//! Persistence capability
//!
//! The rest of the crate reads and writes entities only through [`Datastore`].
//! Events and records are keyed by normalized event name, so lookups are
//! case- and space-insensitive the same way category names are.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::category::{Category, CategoryId};
use crate::error::Result;
use crate::event::Event;
use crate::member::{Member, MemberId};
use crate::record::PointRecord;

/// Read/write access to persisted entities.
///
/// Deleting an entity that does not exist is a no-op that returns `false`.
pub trait Datastore {
    fn category(&self, id: &CategoryId) -> Result<Option<Category>>;
    fn categories(&self) -> Result<Vec<Category>>;
    fn put_category(&mut self, category: Category) -> Result<()>;
    fn delete_category(&mut self, id: &CategoryId) -> Result<bool>;

    fn member(&self, id: &MemberId) -> Result<Option<Member>>;
    fn members(&self) -> Result<Vec<Member>>;
    fn put_member(&mut self, member: Member) -> Result<()>;

    /// Look up an event by name, ignoring case and spaces
    fn event(&self, name: &str) -> Result<Option<Event>>;
    fn events(&self) -> Result<Vec<Event>>;
    fn put_event(&mut self, event: Event) -> Result<()>;
    fn delete_event(&mut self, name: &str) -> Result<bool>;

    fn records(&self) -> Result<Vec<PointRecord>>;
    fn put_record(&mut self, record: PointRecord) -> Result<()>;

    /// Write several records at once; stores that persist per write should
    /// override this to persist once per batch
    fn put_records(&mut self, records: Vec<PointRecord>) -> Result<()> {
        for record in records {
            self.put_record(record)?;
        }
        Ok(())
    }

    fn delete_record(&mut self, member: &MemberId, event_name: &str) -> Result<bool>;

    fn record(&self, member: &MemberId, event_name: &str) -> Result<Option<PointRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .find(|r| &r.member_id == member && r.matches_event(event_name)))
    }

    fn records_for_member(&self, member: &MemberId) -> Result<Vec<PointRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| &r.member_id == member)
            .collect())
    }

    fn records_for_event(&self, event_name: &str) -> Result<Vec<PointRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.matches_event(event_name))
            .collect())
    }
}
