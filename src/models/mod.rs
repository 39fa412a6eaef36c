pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPatch, TaskPriority, TaskQuery, TaskReplace};
pub use user::{User, UserRecord};
