pub mod album_store;
pub mod audit_store;
pub mod invitation_store;
pub mod media_store;
pub mod member_store;
pub mod override_store;

pub use album_store::*;
pub use audit_store::*;
pub use invitation_store::*;
pub use media_store::*;
pub use member_store::*;
pub use override_store::*;
