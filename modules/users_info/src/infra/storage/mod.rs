pub mod document;
pub mod entity;
pub mod in_memory;
pub mod mapper;

pub use document::DocumentUsersRepository;
pub use in_memory::{demo_users, InMemoryUsersRepository};
