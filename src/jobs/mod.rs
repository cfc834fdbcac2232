pub mod factory;
pub mod job;
pub mod queue;

pub use factory::JobFactory;
pub use job::Job;
pub use queue::JobQueue;
