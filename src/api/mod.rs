pub mod album;
pub mod invitations;
pub mod members;
pub mod permissions;
pub mod photos;
