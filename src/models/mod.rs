pub mod todo;
pub mod user;

pub use todo::{Todo, TodoInput, TodoUpdate};
pub use user::{NewUser, PublicUser, StorableUser, User};
