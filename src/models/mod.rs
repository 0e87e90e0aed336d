pub mod task;
pub mod user;

pub use task::{NewTask, ShareRequest, Task, TaskInput, TaskUpdate};
pub use user::{NewUser, User, UserInput};
