//! Category Definitions
//!
//! ポイントカテゴリの定義。ルートカテゴリとその直下のサブカテゴリからなる
//! 深さ2までのフォレストを構成する。

use serde::{Deserialize, Serialize};

use crate::member::Tier;

/// カテゴリの一意識別子
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new() -> Self {
        Self(format!("cat-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// カテゴリ名を正規化する
///
/// 大文字小文字と空白を無視して比較するため、空白を除去して小文字化する。
/// `"Bloob Time"` と `"bloobtime"` は同じカテゴリを指す。
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// ポイントカテゴリ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// 表示名（正規化後に一意）
    pub name: String,
    /// 親カテゴリ（Noneならルート）
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    /// サブカテゴリID（ルートのみ意味を持つ、削除済みIDを含みうる）
    #[serde(default)]
    pub child_ids: Vec<CategoryId>,
    /// 通常メンバーの必要ポイント
    #[serde(default)]
    pub standard_requirement: Option<i64>,
    /// 軽減メンバーの必要ポイント
    #[serde(default)]
    pub reduced_requirement: Option<i64>,
}

impl Category {
    /// 新しいルートカテゴリを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent_id: None,
            child_ids: Vec::new(),
            standard_requirement: None,
            reduced_requirement: None,
        }
    }

    pub fn with_standard_requirement(mut self, points: i64) -> Self {
        self.standard_requirement = Some(points);
        self
    }

    pub fn with_reduced_requirement(mut self, points: i64) -> Self {
        self.reduced_requirement = Some(points);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Tierに応じた必要ポイント（未設定は0）
    pub fn requirement_for(&self, tier: Tier) -> i64 {
        let requirement = match tier {
            Tier::Standard => self.standard_requirement,
            Tier::Reduced => self.reduced_requirement,
        };
        requirement.unwrap_or(0)
    }

    /// サブカテゴリIDを追加（重複は無視）
    pub(crate) fn add_child(&mut self, child: &CategoryId) {
        if !self.child_ids.contains(child) {
            self.child_ids.push(child.clone());
        }
    }

    /// サブカテゴリIDを削除
    pub(crate) fn remove_child(&mut self, child: &CategoryId) -> bool {
        let before = self.child_ids.len();
        self.child_ids.retain(|id| id != child);
        before != self.child_ids.len()
    }
}

/// ルートカテゴリと解決済みサブカテゴリの組
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<Category>,
}

impl CategoryNode {
    /// サブカテゴリの必要ポイント合計
    pub fn children_requirement(&self, tier: Tier) -> i64 {
        self.children
            .iter()
            .map(|c| c.requirement_for(tier))
            .fold(0i64, |acc, r| acc.saturating_add(r))
    }
}

/// 深さ2のカテゴリフォレスト
#[derive(Debug, Clone, Default)]
pub struct CategoryForest {
    pub roots: Vec<CategoryNode>,
}

impl CategoryForest {
    /// 全カテゴリ（ルート、サブカテゴリの順）
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.roots
            .iter()
            .flat_map(|node| std::iter::once(&node.category).chain(node.children.iter()))
    }

    pub fn len(&self) -> usize {
        self.roots.iter().map(|node| 1 + node.children.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
