pub mod approval_service;
pub mod audit_service;
pub mod feedback_service;
pub mod note_service;
pub mod permission_service;
pub mod settings_service;
pub mod transition_service;
