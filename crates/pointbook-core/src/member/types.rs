//! Member Definitions
//!
//! メンバー、Tier、権限、必要ポイントの例外を定義する。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::normalize_name;
use crate::error::PointbookError;

/// メンバーの一意識別子（認証基盤が払い出す）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 必要ポイントの区分
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// 通常メンバー（`standard_requirement`を使う）
    #[default]
    Standard,
    /// 軽減メンバー（`reduced_requirement`を使う）
    Reduced,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reduced => "reduced",
        }
    }
}

impl FromStr for Tier {
    type Err = PointbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "reduced" => Ok(Self::Reduced),
            _ => Err(PointbookError::InvalidTier {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// メンバーの権限
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    User,
    Officer,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Officer => "officer",
        }
    }
}

impl FromStr for Permission {
    type Err = PointbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "officer" => Ok(Self::Officer),
            _ => Err(PointbookError::InvalidPermission {
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// カテゴリ単位の必要ポイント上書き
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointException {
    /// 対象カテゴリ名（比較時は正規化される）
    pub category: String,
    /// 実際に必要なポイント
    pub points_needed: i64,
}

impl PointException {
    pub fn applies_to(&self, category_name: &str) -> bool {
        normalize_name(&self.category) == normalize_name(category_name)
    }
}

/// メンバー
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub tier: Tier,
    /// 現役メンバーか（退会者は削除せず非アクティブにする）
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_permissions")]
    pub permissions: Vec<Permission>,
    /// カテゴリ名ごとに最大1件
    #[serde(default)]
    pub exceptions: Vec<PointException>,
}

fn default_active() -> bool {
    true
}

fn default_permissions() -> Vec<Permission> {
    vec![Permission::User]
}

impl Member {
    pub fn new(id: impl Into<MemberId>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            first_name: String::new(),
            last_name: String::new(),
            tier,
            active: true,
            permissions: default_permissions(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.grant(permission);
        self
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.id.to_string()
        } else {
            full.to_string()
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// 権限を付与（付与済みなら何もしない）
    pub fn grant(&mut self, permission: Permission) -> bool {
        if self.has_permission(permission) {
            return false;
        }
        self.permissions.push(permission);
        true
    }

    pub fn revoke(&mut self, permission: Permission) -> bool {
        let before = self.permissions.len();
        self.permissions.retain(|p| *p != permission);
        before != self.permissions.len()
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
