//! Repository layer for data access

pub mod emails;
pub mod projects;

// Re-export concrete repository implementations with simple names
pub use emails::DbEmailRepository as EmailRepository;
pub use projects::DbProjectRepository as ProjectRepository;

// Re-export repository traits
pub use emails::EmailRepository as EmailRepositoryTrait;
pub use projects::ProjectRepository as ProjectRepositoryTrait;
