pub mod resume;
pub mod subscription;
pub mod user;
