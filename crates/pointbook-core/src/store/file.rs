use std::fs;
use std::path::{Path, PathBuf};

use crate::category::{Category, CategoryId};
use crate::error::{PointbookError, Result};
use crate::event::Event;
use crate::member::{Member, MemberId};
use crate::record::PointRecord;

use super::{Datastore, MemoryStore};

/// JSON file backed datastore
///
/// Reads go to the loaded [`MemoryStore`]; every mutation is written through
/// to disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open `file_name` inside `base_dir`, starting empty if it does not exist
    pub fn open(base_dir: &Path, file_name: &str) -> Result<Self> {
        let path = base_dir.join(file_name);
        if !path.exists() {
            return Ok(Self {
                path,
                inner: MemoryStore::default(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let inner = serde_json::from_str(&content).map_err(|e| PointbookError::StoreParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.inner)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl Datastore for JsonFileStore {
    fn category(&self, id: &CategoryId) -> Result<Option<Category>> {
        self.inner.category(id)
    }

    fn categories(&self) -> Result<Vec<Category>> {
        self.inner.categories()
    }

    fn put_category(&mut self, category: Category) -> Result<()> {
        self.inner.put_category(category)?;
        self.save()
    }

    fn delete_category(&mut self, id: &CategoryId) -> Result<bool> {
        let deleted = self.inner.delete_category(id)?;
        if deleted {
            self.save()?;
        }
        Ok(deleted)
    }

    fn member(&self, id: &MemberId) -> Result<Option<Member>> {
        self.inner.member(id)
    }

    fn members(&self) -> Result<Vec<Member>> {
        self.inner.members()
    }

    fn put_member(&mut self, member: Member) -> Result<()> {
        self.inner.put_member(member)?;
        self.save()
    }

    fn event(&self, name: &str) -> Result<Option<Event>> {
        self.inner.event(name)
    }

    fn events(&self) -> Result<Vec<Event>> {
        self.inner.events()
    }

    fn put_event(&mut self, event: Event) -> Result<()> {
        self.inner.put_event(event)?;
        self.save()
    }

    fn delete_event(&mut self, name: &str) -> Result<bool> {
        let deleted = self.inner.delete_event(name)?;
        if deleted {
            self.save()?;
        }
        Ok(deleted)
    }

    fn records(&self) -> Result<Vec<PointRecord>> {
        self.inner.records()
    }

    fn put_record(&mut self, record: PointRecord) -> Result<()> {
        self.inner.put_record(record)?;
        self.save()
    }

    fn put_records(&mut self, records: Vec<PointRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.inner.put_records(records)?;
        self.save()
    }

    fn delete_record(&mut self, member: &MemberId, event_name: &str) -> Result<bool> {
        let deleted = self.inner.delete_record(member, event_name)?;
        if deleted {
            self.save()?;
        }
        Ok(deleted)
    }
}
