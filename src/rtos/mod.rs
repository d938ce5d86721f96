pub mod scheduler;
pub mod task;

pub use scheduler::{Dispatcher, Scheduler};
pub use task::{PhaseSteps, Task, Ticks};
