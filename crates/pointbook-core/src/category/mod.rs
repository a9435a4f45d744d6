//! # Category Module
//!
//! ポイントカテゴリ（Sisterhood, Philanthropy など）とその階層を扱う。
//!
//! ## 設計目的
//!
//! カテゴリはルートカテゴリと直下のサブカテゴリからなる深さ2のフォレストである。
//! 親子関係はIDで保持し、削除済みカテゴリへの参照は読み取り時に掃除する：
//!
//! - **名前の一意性**: 大文字小文字と空白を無視して比較する
//! - **Upsert**: 同名カテゴリの作成は既存カテゴリの更新になる
//! - **遅延掃除**: `child_ids`の削除済みIDは読み取りのついでに取り除く
//!
//! ## モジュール構成
//!
//! - `types`: カテゴリ定義とフォレスト
//! - `store`: Datastore上のカテゴリ操作
//!
//! ## 使用例
//!
//! ```rust
//! use pointbook_core::category::CategoryStore;
//! use pointbook_core::store::MemoryStore;
//!
//! let mut store = MemoryStore::default();
//! let mut categories = CategoryStore::new(&mut store);
//! categories.upsert("Sisterhood", None).unwrap();
//! categories.upsert("Mixers", Some("Sisterhood")).unwrap();
//!
//! // 名前は大文字小文字・空白を無視して引ける
//! let mixers = categories.find_by_name("mixers").unwrap().unwrap();
//! assert!(!mixers.is_root());
//!
//! let forest = categories.forest().unwrap();
//! assert_eq!(forest.roots.len(), 1);
//! assert_eq!(forest.len(), 2);
//! ```

mod store;
mod types;

// Re-exports
pub use store::CategoryStore;
pub use types::{normalize_name, Category, CategoryForest, CategoryId, CategoryNode};
