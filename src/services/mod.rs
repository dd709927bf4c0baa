pub mod clock;
pub use clock::{Clock, FixedClock, SystemClock};

pub mod task_store;
pub use task_store::TaskStore;

pub mod memory_task_store;
pub use memory_task_store::MemoryTaskStore;

pub mod task_service;
pub use task_service::{RECENT_TASKS_LIMIT, TaskError, TaskService};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, SessionUser};
pub use auth_service_impl::SeaOrmAuthService;
