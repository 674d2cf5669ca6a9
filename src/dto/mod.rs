pub mod approval_dto;
pub mod permission_dto;
pub mod transition_dto;
