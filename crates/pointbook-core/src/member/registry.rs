//! Member Registry
//!
//! メンバーの登録と更新。登録時には全イベント分の空レコードを作成する。

use std::str::FromStr;

use tracing::debug;

use crate::error::{PointbookError, Result};
use crate::record::RecordBook;
use crate::store::Datastore;

use super::resolver::upsert_exception;
use super::types::{Member, MemberId, Permission, PointException, Tier};

/// 一覧表示のフィルタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberFilter {
    Active,
    Inactive,
    #[default]
    Both,
}

impl MemberFilter {
    fn accepts(&self, member: &Member) -> bool {
        match self {
            Self::Active => member.active,
            Self::Inactive => !member.active,
            Self::Both => true,
        }
    }
}

impl FromStr for MemberFilter {
    type Err = PointbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "both" => Ok(Self::Both),
            _ => Err(PointbookError::InvalidFilter {
                value: s.to_string(),
            }),
        }
    }
}

/// メンバー管理
pub struct MemberRegistry<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Datastore + ?Sized> MemberRegistry<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// メンバーを登録し、全イベントの空レコードを作成
    pub fn register(&mut self, member: Member) -> Result<Member> {
        if self.store.member(&member.id)?.is_some() {
            return Err(PointbookError::MemberAlreadyExists {
                id: member.id.to_string(),
            });
        }
        self.store.put_member(member.clone())?;

        let created = RecordBook::new(&mut *self.store).populate_for_member(&member.id)?;
        debug!(member = %member.id, records = created, "registered member");

        Ok(member)
    }

    /// メンバーを取得
    pub fn get(&self, id: &MemberId) -> Result<Member> {
        self.store
            .member(id)?
            .ok_or_else(|| PointbookError::MemberNotFound { id: id.to_string() })
    }

    /// メンバー一覧（名前順）
    pub fn list(&self, filter: MemberFilter) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self
            .store
            .members()?
            .into_iter()
            .filter(|m| filter.accepts(m))
            .collect();
        members.sort_by(|a, b| {
            a.first_name
                .cmp(&b.first_name)
                .then_with(|| a.last_name.cmp(&b.last_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(members)
    }

    pub fn set_active(&mut self, id: &MemberId, active: bool) -> Result<Member> {
        self.modify(id, |m| m.active = active)
    }

    pub fn set_tier(&mut self, id: &MemberId, tier: Tier) -> Result<Member> {
        self.modify(id, |m| m.tier = tier)
    }

    pub fn grant(&mut self, id: &MemberId, permission: Permission) -> Result<Member> {
        self.modify(id, |m| {
            m.grant(permission);
        })
    }

    pub fn revoke(&mut self, id: &MemberId, permission: Permission) -> Result<Member> {
        self.modify(id, |m| {
            m.revoke(permission);
        })
    }

    /// 例外を作成または更新し、そのインデックスを返す
    pub fn set_exception(
        &mut self,
        id: &MemberId,
        category_name: &str,
        points_needed: i64,
    ) -> Result<usize> {
        let mut member = self.get(id)?;
        let index = upsert_exception(&mut member, category_name, points_needed);
        self.store.put_member(member)?;
        Ok(index)
    }

    pub fn exceptions(&self, id: &MemberId) -> Result<Vec<PointException>> {
        Ok(self.get(id)?.exceptions)
    }

    pub fn exception(&self, id: &MemberId, index: usize) -> Result<PointException> {
        self.get(id)?
            .exceptions
            .get(index)
            .cloned()
            .ok_or_else(|| PointbookError::ExceptionNotFound {
                member: id.to_string(),
                index,
            })
    }

    /// インデックス指定で例外を削除
    pub fn remove_exception(&mut self, id: &MemberId, index: usize) -> Result<PointException> {
        let mut member = self.get(id)?;
        if index >= member.exceptions.len() {
            return Err(PointbookError::ExceptionNotFound {
                member: id.to_string(),
                index,
            });
        }
        let removed = member.exceptions.remove(index);
        self.store.put_member(member)?;
        Ok(removed)
    }

    fn modify(&mut self, id: &MemberId, f: impl FnOnce(&mut Member)) -> Result<Member> {
        let mut member = self.get(id)?;
        f(&mut member);
        self.store.put_member(member.clone())?;
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryStore;
    use crate::event::EventBook;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    #[test]
    fn test_register_backfills_records() {
        let mut store = MemoryStore::default();
        CategoryStore::new(&mut store)
            .upsert("Sisterhood", None)
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        let mut events = EventBook::new(&mut store);
        events.create("Mixer", date, "Sisterhood").unwrap();
        events.create("Retreat", date, "Sisterhood").unwrap();

        MemberRegistry::new(&mut store)
            .register(Member::new("u1", Tier::Standard))
            .unwrap();
        assert_eq!(
            store.records_for_member(&MemberId::from("u1")).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let mut store = MemoryStore::default();
        let mut registry = MemberRegistry::new(&mut store);
        registry.register(Member::new("u1", Tier::Standard)).unwrap();
        let err = registry
            .register(Member::new("u1", Tier::Reduced))
            .unwrap_err();
        assert!(matches!(err, PointbookError::MemberAlreadyExists { .. }));
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let mut store = MemoryStore::default();
        let mut registry = MemberRegistry::new(&mut store);
        registry
            .register(Member::new("u1", Tier::Standard).with_name("Zoe", "Adams"))
            .unwrap();
        registry
            .register(Member::new("u2", Tier::Standard).with_name("Amy", "Baker"))
            .unwrap();
        registry
            .register(Member::new("u3", Tier::Reduced).with_name("Kim", "Cole"))
            .unwrap();
        registry.set_active(&MemberId::from("u3"), false).unwrap();

        let all = registry.list(MemberFilter::Both).unwrap();
        let names: Vec<_> = all.iter().map(|m| m.first_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Kim", "Zoe"]);

        let inactive = registry.list(MemberFilter::Inactive).unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].id, MemberId::from("u3"));
        assert_eq!(registry.list(MemberFilter::Active).unwrap().len(), 2);
        assert_eq!("Active".parse::<MemberFilter>().unwrap(), MemberFilter::Active);
        let err = "everyone".parse::<MemberFilter>().unwrap_err();
        assert!(matches!(err, PointbookError::InvalidFilter { .. }));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exception_lifecycle() {
        let mut store = MemoryStore::default();
        let mut registry = MemberRegistry::new(&mut store);
        let id = MemberId::from("u1");
        registry.register(Member::new("u1", Tier::Standard)).unwrap();

        assert_eq!(registry.set_exception(&id, "Mixers", 5).unwrap(), 0);
        assert_eq!(registry.set_exception(&id, "Service", 2).unwrap(), 1);
        assert_eq!(registry.set_exception(&id, "mixers", 6).unwrap(), 0);
        assert_eq!(registry.exceptions(&id).unwrap().len(), 2);
        assert_eq!(registry.exception(&id, 0).unwrap().points_needed, 6);

        let removed = registry.remove_exception(&id, 0).unwrap();
        assert_eq!(removed.category, "Mixers");
        let err = registry.remove_exception(&id, 5).unwrap_err();
        assert!(matches!(err, PointbookError::ExceptionNotFound { .. }));
        assert_eq!(registry.exception(&id, 0).unwrap().category, "Service");
    }

    #[test]
    fn test_unknown_member() {
        let mut store = MemoryStore::default();
        let mut registry = MemberRegistry::new(&mut store);
        let err = registry
            .set_tier(&MemberId::from("ghost"), Tier::Reduced)
            .unwrap_err();
        assert!(matches!(err, PointbookError::MemberNotFound { .. }));
    }
}
