//! Business operations. Each service receives its storage handle at construction
//! and holds no other state.

pub mod tasks;
pub mod users;

pub use tasks::TaskService;
pub use users::UserService;
