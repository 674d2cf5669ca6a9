pub mod applications;
pub mod approvals;
pub mod health;
pub mod permissions;
pub mod settings;
