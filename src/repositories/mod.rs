pub mod in_memory_roles_repository;
pub mod postgres_roles_repository;
pub mod roles_repository;

pub use in_memory_roles_repository::InMemoryRolesRepository;
pub use postgres_roles_repository::PostgresRolesRepository;
pub use roles_repository::RolesRepository;
