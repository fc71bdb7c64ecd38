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
//! Node-queue scheduler: a fixed pool of workers spread over one task queue per node.
//!
//! Lifecycle is owned by the caller: `new` -> `begin` -> ... -> `finish`. Tasks scheduled
//! after `finish` run inline on the calling thread.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::common::config;
use crate::common::ids::{CpuId, NodeId, WorkerId};
use crate::ferroscan_logging::{info, warn};
use crate::runtime::task::{Task, TaskContext};
use crate::runtime::task_queue::TaskQueue;
use crate::runtime::worker::Worker;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub worker_threads: usize,
    pub node_queues: usize,
    pub pin_workers: bool,
    pub idle_wait: Duration,
}

impl SchedulerConfig {
    pub fn from_app_config() -> Self {
        Self {
            worker_threads: config::scheduler_worker_threads(),
            node_queues: config::scheduler_node_queues(),
            pin_workers: config::scheduler_pin_workers(),
            idle_wait: Duration::from_micros(config::scheduler_idle_wait_us()),
        }
    }

    pub fn with_workers(worker_threads: usize) -> Self {
        Self {
            worker_threads,
            node_queues: 1,
            pin_workers: false,
            idle_wait: Duration::from_millis(1),
        }
    }
}

pub struct NodeQueueScheduler {
    config: SchedulerConfig,
    queues: Vec<Arc<TaskQueue>>,
    workers: Vec<Arc<Worker>>,
    shutdown: Arc<AtomicBool>,
    started: AtomicBool,
    next_queue: AtomicUsize,
    finish_lock: Mutex<()>,
    /// Held shared while a task is enqueued and exclusively while shutdown is raised, so no
    /// task lands in a queue after its workers have decided to exit.
    lifecycle: RwLock<()>,
}

impl NodeQueueScheduler {
    pub fn new(config: SchedulerConfig) -> Arc<Self> {
        let worker_threads = config.worker_threads.max(1);
        let node_queues = config.node_queues.clamp(1, worker_threads);
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Arc::new_cyclic(|weak| {
            let shutdown = Arc::new(AtomicBool::new(false));
            let queues: Vec<Arc<TaskQueue>> = (0..node_queues)
                .map(|n| Arc::new(TaskQueue::new(NodeId(n as u32))))
                .collect();
            let workers = (0..worker_threads)
                .map(|w| {
                    let cpu_id = config.pin_workers.then(|| CpuId((w % cores) as u32));
                    Worker::new(
                        WorkerId(w as u32),
                        cpu_id,
                        Arc::clone(&queues[w % node_queues]),
                        queues.clone(),
                        Arc::clone(&shutdown),
                        config.idle_wait,
                        weak.clone(),
                    )
                })
                .collect();
            Self {
                config: SchedulerConfig {
                    worker_threads,
                    node_queues,
                    ..config
                },
                queues,
                workers,
                shutdown,
                started: AtomicBool::new(false),
                next_queue: AtomicUsize::new(0),
                finish_lock: Mutex::new(()),
                lifecycle: RwLock::new(()),
            }
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn queues(&self) -> &[Arc<TaskQueue>] {
        &self.queues
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Start all worker threads.
    pub fn begin(&self) -> Result<(), String> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        for worker in &self.workers {
            worker.start()?;
        }
        info!(
            worker_threads = self.config.worker_threads,
            node_queues = self.config.node_queues,
            pin_workers = self.config.pin_workers,
            "scheduler started"
        );
        Ok(())
    }

    /// Signal shutdown and wait for the workers to drain their queues and exit.
    pub fn finish(&self) {
        let _guard = self.finish_lock.lock().expect("scheduler finish lock");
        {
            let _lifecycle = self.lifecycle.write().expect("scheduler lifecycle lock");
            if self.shutdown.swap(true, Ordering::SeqCst) {
                return;
            }
        }
        for queue in &self.queues {
            queue.notify_all();
        }
        for worker in &self.workers {
            worker.join();
        }
        info!("scheduler finished");
    }

    pub(crate) fn schedule(&self, task: Arc<Task>) {
        task.mark_scheduled();
        {
            let _lifecycle = self.lifecycle.read().expect("scheduler lifecycle lock");
            if !self.is_shutdown() && self.started.load(Ordering::Acquire) {
                let queue_idx = match task.preferred_node() {
                    Some(node) if node.as_usize() < self.queues.len() => node.as_usize(),
                    _ => self.next_queue.fetch_add(1, Ordering::Relaxed) % self.queues.len(),
                };
                self.queues[queue_idx].push(task);
                return;
            }
        }
        warn!(
            task_id = task.id().get(),
            "scheduler not running; executing task inline"
        );
        task.execute(&TaskContext::inline());
    }
}

impl Drop for NodeQueueScheduler {
    fn drop(&mut self) {
        // Workers only hold a weak back-reference; make sure their threads exit.
        self.shutdown.store(true, Ordering::SeqCst);
        for queue in &self.queues {
            queue.notify_all();
        }
    }
}
