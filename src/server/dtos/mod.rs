pub mod addon_dto;
pub mod stream_dto;
