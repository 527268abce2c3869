pub mod album;
pub mod album_member;
pub mod audit_log;
pub mod invitation;
pub mod jobs;
pub mod media_item;
pub mod permission_override;

pub use album::*;
pub use album_member::*;
pub use audit_log::*;
pub use invitation::*;
pub use jobs::*;
pub use media_item::*;
pub use permission_override::*;
