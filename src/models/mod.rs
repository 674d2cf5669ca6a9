pub mod application;
pub mod audit_event;
pub mod hire_approval;
pub mod interview;
pub mod note;
pub mod permission;
pub mod user;
