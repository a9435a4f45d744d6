//! Category Store
//!
//! カテゴリフォレストの読み書き。
//! Datastore上のカテゴリを名前（正規化）とIDで引き、親子関係を管理する。

use tracing::warn;

use crate::error::{PointbookError, Result};
use crate::store::Datastore;

use super::types::{normalize_name, Category, CategoryForest, CategoryId, CategoryNode};

/// カテゴリ定義のストア
pub struct CategoryStore<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: Datastore + ?Sized> CategoryStore<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// IDでカテゴリを取得
    pub fn get(&self, id: &CategoryId) -> Result<Option<Category>> {
        self.store.category(id)
    }

    /// 名前でカテゴリを取得（大文字小文字・空白を無視）
    pub fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let key = normalize_name(name);
        Ok(self
            .store
            .categories()?
            .into_iter()
            .find(|c| c.normalized_name() == key))
    }

    /// ルートカテゴリ一覧（名前順）
    pub fn get_root_categories(&self) -> Result<Vec<Category>> {
        let mut roots: Vec<Category> = self
            .store
            .categories()?
            .into_iter()
            .filter(Category::is_root)
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roots)
    }

    /// サブカテゴリ一覧
    ///
    /// `child_ids`の順序を保つ。解決できないIDは読み飛ばす（永続化はしない）。
    pub fn get_children(&self, category: &Category) -> Result<Vec<Category>> {
        let mut children = Vec::with_capacity(category.child_ids.len());
        for id in &category.child_ids {
            if let Some(child) = self.store.category(id)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    /// 親カテゴリを取得
    pub fn parent_of(&self, category: &Category) -> Result<Option<Category>> {
        match &category.parent_id {
            Some(id) => self.store.category(id),
            None => Ok(None),
        }
    }

    /// 削除済みのサブカテゴリIDを取り除いて保存する
    ///
    /// 取り除いたIDを返す。何もなければ書き込まない。
    pub fn prune_stale_children(&mut self, category: &Category) -> Result<Vec<CategoryId>> {
        let mut stale = Vec::new();
        for id in &category.child_ids {
            if self.store.category(id)?.is_none() {
                stale.push(id.clone());
            }
        }
        if stale.is_empty() {
            return Ok(stale);
        }

        // 引数が古いスナップショットの可能性があるため保存済みの値を更新する
        let Some(mut stored) = self.store.category(&category.id)? else {
            return Ok(Vec::new());
        };
        stale.retain(|id| stored.remove_child(id));
        if stale.is_empty() {
            return Ok(stale);
        }
        for id in &stale {
            warn!(
                category = %stored.name,
                child = %id,
                "pruned stale sub-category reference"
            );
        }
        self.store.put_category(stored)?;
        Ok(stale)
    }

    /// カテゴリフォレストを構築（読み取りのみ）
    pub fn forest(&self) -> Result<CategoryForest> {
        let mut roots = Vec::new();
        for category in self.get_root_categories()? {
            let children = self.get_children(&category)?;
            roots.push(CategoryNode { category, children });
        }
        Ok(CategoryForest { roots })
    }

    /// 削除済み参照を掃除してからフォレストを構築
    pub fn list_tree(&mut self) -> Result<CategoryForest> {
        for root in self.get_root_categories()? {
            self.prune_stale_children(&root)?;
        }
        self.forest()
    }

    /// カテゴリを作成または更新
    ///
    /// - 正規化後の名前が一致するカテゴリがあればそれを更新する（重複作成しない）
    /// - `parent`を指定するとそのサブカテゴリになり、旧親からは外れる
    /// - 深さは2まで（親はルート、サブカテゴリを持つカテゴリは子になれない）
    pub fn upsert(&mut self, name: &str, parent: Option<&str>) -> Result<Category> {
        let key = normalize_name(name);
        if key.is_empty() {
            return Err(PointbookError::InvalidCategoryName {
                name: name.to_string(),
            });
        }

        let parent = match parent {
            Some(parent_name) => {
                let parent = self.find_by_name(parent_name)?.ok_or_else(|| {
                    PointbookError::CategoryNotFound {
                        name: parent_name.to_string(),
                    }
                })?;
                if parent.normalized_name() == key || !parent.is_root() {
                    return Err(PointbookError::CategoryDepthExceeded {
                        name: name.to_string(),
                        parent: parent.name,
                    });
                }
                Some(parent)
            }
            None => None,
        };

        let mut category = match self.find_by_name(name)? {
            Some(existing) => existing,
            None => Category::new(name),
        };

        if let Some(parent) = &parent {
            if !self.get_children(&category)?.is_empty() {
                return Err(PointbookError::CategoryDepthExceeded {
                    name: category.name,
                    parent: parent.name.clone(),
                });
            }
        }

        let new_parent_id = parent.as_ref().map(|p| p.id.clone());
        if category.parent_id != new_parent_id {
            if let Some(old_parent_id) = &category.parent_id {
                if let Some(mut old_parent) = self.store.category(old_parent_id)? {
                    old_parent.remove_child(&category.id);
                    self.store.put_category(old_parent)?;
                }
            }
            category.parent_id = new_parent_id;
        }

        if let Some(mut parent) = parent {
            parent.add_child(&category.id);
            self.store.put_category(parent)?;
        }

        self.store.put_category(category.clone())?;
        Ok(category)
    }

    /// 必要ポイントを更新（Noneの項目は変更しない）
    pub fn set_requirements(
        &mut self,
        name: &str,
        standard: Option<i64>,
        reduced: Option<i64>,
    ) -> Result<Category> {
        let mut category =
            self.find_by_name(name)?
                .ok_or_else(|| PointbookError::CategoryNotFound {
                    name: name.to_string(),
                })?;

        if standard.is_some() {
            category.standard_requirement = standard;
        }
        if reduced.is_some() {
            category.reduced_requirement = reduced;
        }

        self.store.put_category(category.clone())?;
        Ok(category)
    }

    /// カテゴリを削除
    ///
    /// イベントから参照されている、またはサブカテゴリを持つ場合は拒否する。
    /// 親の`child_ids`には削除済みIDが残り、次回の読み取り時に掃除される。
    pub fn delete(&mut self, name: &str) -> Result<Category> {
        let category =
            self.find_by_name(name)?
                .ok_or_else(|| PointbookError::CategoryNotFound {
                    name: name.to_string(),
                })?;

        let events: Vec<String> = self
            .store
            .events()?
            .into_iter()
            .filter(|e| e.category_id == category.id)
            .map(|e| e.name)
            .collect();
        if !events.is_empty() {
            return Err(PointbookError::CategoryInUse {
                name: category.name,
                events,
            });
        }

        let children: Vec<String> = self
            .get_children(&category)?
            .into_iter()
            .map(|c| c.name)
            .collect();
        if !children.is_empty() {
            return Err(PointbookError::CategoryHasChildren {
                name: category.name,
                children,
            });
        }

        self.store.delete_category(&category.id)?;
        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn sisterhood() -> MemoryStore {
        let mut store = MemoryStore::default();
        let mut categories = CategoryStore::new(&mut store);
        categories.upsert("Sisterhood", None).unwrap();
        categories.upsert("Mixers", Some("Sisterhood")).unwrap();
        categories.upsert("Bloob Time", Some("Sisterhood")).unwrap();
        store
    }

    #[test]
    fn test_upsert_builds_two_level_forest() {
        let mut store = sisterhood();
        let categories = CategoryStore::new(&mut store);

        let forest = categories.forest().unwrap();
        assert_eq!(forest.roots.len(), 1);
        let root = &forest.roots[0];
        assert_eq!(root.category.name, "Sisterhood");
        let names: Vec<_> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Mixers", "Bloob Time"]);
        assert_eq!(root.children[0].parent_id, Some(root.category.id.clone()));
    }

    #[test]
    fn test_upsert_is_idempotent_by_normalized_name() {
        let mut store = sisterhood();
        let mut categories = CategoryStore::new(&mut store);

        let before = categories.find_by_name("Bloob Time").unwrap().unwrap();
        let after = categories.upsert("bloobtime", Some("sisterhood")).unwrap();
        assert_eq!(before.id, after.id);
        assert_eq!(after.name, "Bloob Time");

        assert_eq!(store.categories().unwrap().len(), 3);
        let root = CategoryStore::new(&mut store)
            .find_by_name("Sisterhood")
            .unwrap()
            .unwrap();
        assert_eq!(root.child_ids.len(), 2);
    }

    #[test]
    fn test_upsert_reparents() {
        let mut store = sisterhood();
        let mut categories = CategoryStore::new(&mut store);
        categories.upsert("Philanthropy", None).unwrap();
        categories.upsert("Mixers", Some("Philanthropy")).unwrap();

        let sisterhood = categories.find_by_name("Sisterhood").unwrap().unwrap();
        let philanthropy = categories.find_by_name("Philanthropy").unwrap().unwrap();
        let mixers = categories.find_by_name("Mixers").unwrap().unwrap();
        assert!(!sisterhood.child_ids.contains(&mixers.id));
        assert_eq!(philanthropy.child_ids, vec![mixers.id.clone()]);
        assert_eq!(mixers.parent_id, Some(philanthropy.id));

        categories.upsert("Mixers", None).unwrap();
        let mixers = categories.find_by_name("Mixers").unwrap().unwrap();
        assert!(mixers.is_root());
        let philanthropy = categories.find_by_name("Philanthropy").unwrap().unwrap();
        assert!(philanthropy.child_ids.is_empty());
    }

    #[test]
    fn test_upsert_enforces_depth() {
        let mut store = sisterhood();
        let mut categories = CategoryStore::new(&mut store);

        let err = categories.upsert("Speed Mixers", Some("Mixers")).unwrap_err();
        assert!(matches!(err, PointbookError::CategoryDepthExceeded { .. }));

        categories.upsert("Philanthropy", None).unwrap();
        let err = categories
            .upsert("Sisterhood", Some("Philanthropy"))
            .unwrap_err();
        assert!(matches!(err, PointbookError::CategoryDepthExceeded { .. }));

        let err = categories.upsert("Sisterhood", Some("sister hood")).unwrap_err();
        assert!(matches!(err, PointbookError::CategoryDepthExceeded { .. }));

        let err = categories.upsert("   ", None).unwrap_err();
        assert!(matches!(err, PointbookError::InvalidCategoryName { .. }));
    }

    #[test]
    fn test_get_children_skips_stale_without_writing() {
        let mut store = sisterhood();
        let mixers = CategoryStore::new(&mut store)
            .find_by_name("Mixers")
            .unwrap()
            .unwrap();
        store.delete_category(&mixers.id).unwrap();

        let categories = CategoryStore::new(&mut store);
        let root = categories.find_by_name("Sisterhood").unwrap().unwrap();
        let children = categories.get_children(&root).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(root.child_ids.len(), 2);
    }

    #[test]
    fn test_prune_stale_children_persists_once() {
        let mut store = sisterhood();
        let mixers = CategoryStore::new(&mut store)
            .find_by_name("Mixers")
            .unwrap()
            .unwrap();
        store.delete_category(&mixers.id).unwrap();

        let mut categories = CategoryStore::new(&mut store);
        let root = categories.find_by_name("Sisterhood").unwrap().unwrap();
        assert_eq!(categories.prune_stale_children(&root).unwrap(), vec![mixers.id]);

        // 古いスナップショットで再実行しても何も起きない
        assert!(categories.prune_stale_children(&root).unwrap().is_empty());
        let root = categories.find_by_name("Sisterhood").unwrap().unwrap();
        assert_eq!(root.child_ids.len(), 1);
        assert!(categories.prune_stale_children(&root).unwrap().is_empty());
    }

    #[test]
    fn test_set_requirements_patches_fields() {
        let mut store = sisterhood();
        let mut categories = CategoryStore::new(&mut store);
        categories
            .set_requirements("Sisterhood", Some(20), None)
            .unwrap();
        let cat = categories
            .set_requirements("sisterhood", None, Some(10))
            .unwrap();
        assert_eq!(cat.standard_requirement, Some(20));
        assert_eq!(cat.reduced_requirement, Some(10));
    }

    #[test]
    fn test_delete_guards() {
        let mut store = sisterhood();
        let mixers = CategoryStore::new(&mut store)
            .find_by_name("Mixers")
            .unwrap()
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        store
            .put_event(Event::new("Spring Mixer", date, mixers.id.clone()))
            .unwrap();

        let mut categories = CategoryStore::new(&mut store);
        let err = categories.delete("Mixers").unwrap_err();
        assert!(matches!(err, PointbookError::CategoryInUse { .. }));

        let err = categories.delete("Sisterhood").unwrap_err();
        assert!(matches!(err, PointbookError::CategoryHasChildren { .. }));

        categories.delete("Bloob Time").unwrap();
        let root = categories.find_by_name("Sisterhood").unwrap().unwrap();
        assert_eq!(root.child_ids.len(), 2);

        let tree = categories.list_tree().unwrap();
        assert_eq!(tree.roots[0].children.len(), 1);
        assert_eq!(tree.roots[0].category.child_ids.len(), 1);
    }
}
