use std::collections::VecDeque;

use crate::config::PopOrder;
use crate::jobs::Job;

/// Jobs in construction order. Only ever shrinks once the run starts.
#[derive(Debug)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
    order: PopOrder,
}

impl JobQueue {
    pub fn new(order: PopOrder) -> Self {
        Self {
            jobs: VecDeque::new(),
            order,
        }
    }

    pub fn with_jobs(jobs: Vec<Job>, order: PopOrder) -> Self {
        Self {
            jobs: jobs.into(),
            order,
        }
    }

    pub fn push(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// LIFO takes the most recently constructed job, FIFO the oldest.
    pub fn pop(&mut self) -> Option<Job> {
        match self.order {
            PopOrder::Lifo => self.jobs.pop_back(),
            PopOrder::Fifo => self.jobs.pop_front(),
        }
    }

    pub fn order(&self) -> PopOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in the order they would be popped. Does not consume the queue.
    pub fn execution_order(&self) -> Vec<&Job> {
        match self.order {
            PopOrder::Lifo => self.jobs.iter().rev().collect(),
            PopOrder::Fifo => self.jobs.iter().collect(),
        }
    }
}
