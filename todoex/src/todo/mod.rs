//! Todo items owned by a single user.
//!
//! All reads and writes go through a [`TodoRepository`] and are scoped by the
//! owner's id. Deletion is soft: archived items drop out of listings while the
//! row stays.

pub mod errors;
pub mod models;
pub mod repository;

pub use errors::{TodoError, TodoResult};
pub use models::{NewTodo, Todo, TodoId, TodoPatch, TodoStatus, UnknownStatus};
pub use repository::{MemoryTodoRepository, PgTodoRepository, TodoRepository};
