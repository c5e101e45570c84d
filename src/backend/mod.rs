pub mod feed;
pub mod identity;
pub mod memory;
pub mod object;
pub mod records;
pub mod store;

pub use feed::{ChangeEvent, ChangeFeed, ChangeKind, FeedRow, FeedSubscription, FeedTable};
pub use identity::{Credentials, IdentityProvider, Session};
pub use memory::MemoryBackend;
pub use object::ObjectStore;
pub use records::{CommentRecord, FileCategory, FileRecord, MembershipRecord, ProfileRecord, RoomRecord};
pub use store::{DataStore, StoreError};
