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
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::common::ids::{CpuId, WorkerId};
use crate::ferroscan_logging::{debug, info};
use crate::runtime::current_scheduler::SchedulerHandle;
use crate::runtime::scheduler::NodeQueueScheduler;
use crate::runtime::task::{Task, TaskContext};
use crate::runtime::task_queue::TaskQueue;

/// OS thread bound to one task queue. Steals from the other queues when its own is empty.
pub struct Worker {
    id: WorkerId,
    cpu_id: Option<CpuId>,
    queue: Arc<TaskQueue>,
    all_queues: Vec<Arc<TaskQueue>>,
    shutdown: Arc<AtomicBool>,
    idle_wait: Duration,
    num_finished_tasks: AtomicU64,
    thread: Mutex<Option<JoinHandle<()>>>,
    scheduler: Weak<NodeQueueScheduler>,
}

impl Worker {
    pub(crate) fn new(
        id: WorkerId,
        cpu_id: Option<CpuId>,
        queue: Arc<TaskQueue>,
        all_queues: Vec<Arc<TaskQueue>>,
        shutdown: Arc<AtomicBool>,
        idle_wait: Duration,
        scheduler: Weak<NodeQueueScheduler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            cpu_id,
            queue,
            all_queues,
            shutdown,
            idle_wait,
            num_finished_tasks: AtomicU64::new(0),
            thread: Mutex::new(None),
            scheduler,
        })
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn cpu_id(&self) -> Option<CpuId> {
        self.cpu_id
    }

    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }

    pub fn num_finished_tasks(&self) -> u64 {
        self.num_finished_tasks.load(Ordering::Relaxed)
    }

    pub(crate) fn start(self: &Arc<Self>) -> Result<(), String> {
        let mut slot = self.thread.lock().expect("worker thread lock");
        if slot.is_some() {
            return Ok(());
        }
        let worker = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("ferroscan_worker_{}", self.id))
            .spawn(move || worker.run())
            .map_err(|e| format!("spawn worker {} failed: {}", self.id, e))?;
        *slot = Some(handle);
        Ok(())
    }

    fn run(self: Arc<Self>) {
        if let Some(cpu) = self.cpu_id {
            // Affinity is advisory; no pinning is performed.
            debug!(worker_id = self.id.get(), cpu = cpu.get(), "worker cpu hint");
        }
        info!(
            worker_id = self.id.get(),
            node_id = self.queue.node_id().get(),
            "worker started"
        );
        loop {
            if self.shutdown.load(Ordering::Acquire) && self.queue.is_empty() {
                break;
            }
            self.work();
        }
        info!(
            worker_id = self.id.get(),
            finished_tasks = self.num_finished_tasks(),
            "worker stopped"
        );
    }

    fn next_task(&self) -> Option<Arc<Task>> {
        if let Some(task) = self.queue.try_pop() {
            return Some(task);
        }
        for other in &self.all_queues {
            if Arc::ptr_eq(other, &self.queue) {
                continue;
            }
            if let Some(task) = other.try_pop() {
                return Some(task);
            }
        }
        self.queue.pop_timeout(self.idle_wait)
    }

    fn context(self: &Arc<Self>) -> TaskContext {
        let scheduler = self
            .scheduler
            .upgrade()
            .map(SchedulerHandle::new)
            .unwrap_or_default();
        TaskContext {
            scheduler,
            worker: Some(Arc::clone(self)),
        }
    }

    /// Run at most one task. Returns whether a task was run.
    pub fn work(self: &Arc<Self>) -> bool {
        let Some(task) = self.next_task() else {
            return false;
        };
        task.execute(&self.context());
        self.num_finished_tasks.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Keep this worker busy with queued tasks until every task in `tasks` is done. Callable
    /// from a job running on this worker.
    pub fn wait_for_tasks(self: &Arc<Self>, tasks: &[Arc<Task>]) {
        while !tasks.iter().all(|t| t.is_done()) {
            self.work();
        }
    }

    /// Wait for the worker thread to exit. A no-op from the worker's own thread.
    pub(crate) fn join(&self) {
        let handle = self.thread.lock().expect("worker thread lock").take();
        let Some(handle) = handle else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            crate::ferroscan_logging::error!(worker_id = self.id.get(), "worker thread panicked");
        }
    }
}
