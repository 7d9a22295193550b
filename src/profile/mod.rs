pub mod profile_dto;
pub mod profile_handlers;
pub mod profile_models;
pub mod profile_repository;

pub use profile_dto::UpsertProfileRequest;
pub use profile_handlers::{get_me, get_profile, update_me};
pub use profile_models::{Profile, ProfileResponse};
pub use profile_repository::ProfileRepository;
