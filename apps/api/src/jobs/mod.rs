// Job tracking: in-memory storage plus the CRUD endpoints over it.

pub mod handlers;
pub mod store;
