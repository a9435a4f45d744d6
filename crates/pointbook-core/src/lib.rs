pub mod access;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod member;
pub mod record;
pub mod store;

pub use access::{AccessPolicy, PermissionPolicy};
pub use config::Config;
pub use error::{PointbookError, Result};
pub use event::{Event, EventBook, EventUpdate, EventView};
pub use member::{
    Member, MemberFilter, MemberId, MemberRegistry, Permission, PointException, Tier,
};
pub use record::{PointRecord, RecordBook, RecordFilter, RecordView};
pub use store::{Datastore, JsonFileStore, MemoryStore};

// Category system
pub use category::{Category, CategoryForest, CategoryId, CategoryNode, CategoryStore};

// Points engine
pub use engine::{
    CategoryPoints, HealReport, HierarchyResult, PointsEngine, PointsReport, SubCategoryPoints,
};
