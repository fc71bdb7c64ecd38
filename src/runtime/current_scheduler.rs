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
//! Scheduler facade threaded through execution.
//!
//! An empty handle means synchronous mode: every scheduled task runs immediately on the
//! calling thread.

use std::sync::Arc;

use crate::runtime::scheduler::NodeQueueScheduler;
use crate::runtime::task::{Task, TaskContext};
use crate::runtime::worker::Worker;

#[derive(Clone, Default)]
pub struct SchedulerHandle {
    scheduler: Option<Arc<NodeQueueScheduler>>,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("active", &self.is_set())
            .finish()
    }
}

impl SchedulerHandle {
    pub fn new(scheduler: Arc<NodeQueueScheduler>) -> Self {
        Self {
            scheduler: Some(scheduler),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.scheduler.is_some()
    }

    pub fn scheduler(&self) -> Option<&Arc<NodeQueueScheduler>> {
        self.scheduler.as_ref()
    }

    pub fn schedule(&self, task: &Arc<Task>) {
        match &self.scheduler {
            Some(scheduler) => scheduler.schedule(Arc::clone(task)),
            None => {
                task.mark_scheduled();
                task.execute(&TaskContext::inline());
            }
        }
    }

    pub fn schedule_tasks(&self, tasks: &[Arc<Task>]) {
        for task in tasks {
            self.schedule(task);
        }
    }

    /// Wait until all `tasks` are done and return the first recorded failure.
    ///
    /// Pass the current worker when calling from inside a running task: the worker keeps
    /// executing queued tasks while it waits instead of blocking its thread.
    pub fn wait_for_tasks(
        &self,
        tasks: &[Arc<Task>],
        worker: Option<&Arc<Worker>>,
    ) -> Result<(), String> {
        debug_assert!(
            tasks.iter().all(|t| t.is_scheduled()),
            "wait_for_tasks called with unscheduled tasks"
        );
        match worker {
            Some(worker) => worker.wait_for_tasks(tasks),
            None => tasks.iter().for_each(|t| t.join()),
        }
        match tasks.iter().find_map(|t| t.failure()) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    pub fn schedule_and_wait_for_tasks(
        &self,
        tasks: &[Arc<Task>],
        worker: Option<&Arc<Worker>>,
    ) -> Result<(), String> {
        self.schedule_tasks(tasks);
        self.wait_for_tasks(tasks, worker)
    }
}
