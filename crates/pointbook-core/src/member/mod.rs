mod registry;
mod resolver;
mod types;

pub use registry::{MemberFilter, MemberRegistry};
pub use resolver::{requirement_override, tier_for, upsert_exception};
pub use types::{Member, MemberId, Permission, PointException, Tier};
