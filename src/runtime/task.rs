// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
//! Unit of schedulable work.
//!
//! State machine: `Unscheduled -> Scheduled -> Running -> Done`. A task runs exactly once. Job
//! errors and panics are both recorded as the task's failure; the task still reaches `Done`.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::common::ids::{NodeId, TaskId};
use crate::ferroscan_logging::warn;
use crate::runtime::current_scheduler::SchedulerHandle;
use crate::runtime::worker::Worker;

pub type TaskJob = Box<dyn FnOnce(&TaskContext) -> Result<(), String> + Send + 'static>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum TaskState {
    Unscheduled = 0,
    Scheduled = 1,
    Running = 2,
    Done = 3,
}

impl TaskState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => TaskState::Unscheduled,
            1 => TaskState::Scheduled,
            2 => TaskState::Running,
            _ => TaskState::Done,
        }
    }
}

/// What a running job can see of its environment. `worker` is set when the job runs on a
/// scheduler worker, and must be handed to any nested wait.
#[derive(Clone, Default)]
pub struct TaskContext {
    pub scheduler: SchedulerHandle,
    pub worker: Option<Arc<Worker>>,
}

impl TaskContext {
    pub fn inline() -> Self {
        Self::default()
    }
}

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(0);

pub struct Task {
    id: TaskId,
    state: AtomicU8,
    job: Mutex<Option<TaskJob>>,
    done: Mutex<bool>,
    done_cv: Condvar,
    failure: Mutex<Option<String>>,
    preferred_node: Option<NodeId>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("preferred_node", &self.preferred_node)
            .finish()
    }
}

impl Task {
    pub fn new<F>(job: F) -> Arc<Self>
    where
        F: FnOnce(&TaskContext) -> Result<(), String> + Send + 'static,
    {
        Self::build(Box::new(job), None)
    }

    /// Task that should be queued on `node` instead of round robin.
    pub fn with_preferred_node<F>(job: F, node: NodeId) -> Arc<Self>
    where
        F: FnOnce(&TaskContext) -> Result<(), String> + Send + 'static,
    {
        Self::build(Box::new(job), Some(node))
    }

    fn build(job: TaskJob, preferred_node: Option<NodeId>) -> Arc<Self> {
        Arc::new(Self {
            id: TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed)),
            state: AtomicU8::new(TaskState::Unscheduled as u8),
            job: Mutex::new(Some(job)),
            done: Mutex::new(false),
            done_cv: Condvar::new(),
            failure: Mutex::new(None),
            preferred_node,
        })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_scheduled(&self) -> bool {
        self.state() != TaskState::Unscheduled
    }

    pub fn is_done(&self) -> bool {
        self.state() == TaskState::Done
    }

    pub fn preferred_node(&self) -> Option<NodeId> {
        self.preferred_node
    }

    /// Panics if the task was already scheduled.
    pub(crate) fn mark_scheduled(&self) {
        let prev = self.state.compare_exchange(
            TaskState::Unscheduled as u8,
            TaskState::Scheduled as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if let Err(actual) = prev {
            panic!(
                "task {} scheduled twice (state {:?})",
                self.id,
                TaskState::from_u8(actual)
            );
        }
    }

    pub(crate) fn execute(&self, ctx: &TaskContext) {
        self.state
            .store(TaskState::Running as u8, Ordering::Release);
        let job = self.job.lock().expect("task job lock").take();
        let result = match job {
            Some(job) => std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| job(ctx)))
                .unwrap_or_else(|payload| {
                    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = payload.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "unknown panic payload".to_string()
                    };
                    warn!(task_id = self.id.get(), "task panicked: {msg}");
                    Err(format!("panic in task execution: {msg}"))
                }),
            None => Err(format!("task {} executed twice", self.id)),
        };
        if let Err(e) = result {
            *self.failure.lock().expect("task failure lock") = Some(e);
        }
        let mut done = self.done.lock().expect("task done lock");
        self.state.store(TaskState::Done as u8, Ordering::Release);
        *done = true;
        self.done_cv.notify_all();
    }

    /// Block until the task is done. Panics if the task was never scheduled, since nothing
    /// would ever run it.
    pub fn join(&self) {
        assert!(
            self.is_scheduled(),
            "join on task {} that was never scheduled",
            self.id
        );
        let mut done = self.done.lock().expect("task done lock");
        while !*done {
            done = self.done_cv.wait(done).expect("task done condvar wait");
        }
    }

    pub fn failure(&self) -> Option<String> {
        self.failure.lock().expect("task failure lock").clone()
    }
}
