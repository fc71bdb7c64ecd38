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
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::common::ids::NodeId;
use crate::runtime::task::Task;

/// FIFO of scheduled tasks for one node.
pub struct TaskQueue {
    node_id: NodeId,
    tasks: Mutex<VecDeque<Arc<Task>>>,
    cv: Condvar,
}

impl TaskQueue {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            tasks: Mutex::new(VecDeque::new()),
            cv: Condvar::new(),
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn push(&self, task: Arc<Task>) {
        let mut tasks = self.tasks.lock().expect("task queue lock");
        tasks.push_back(task);
        self.cv.notify_one();
    }

    pub fn try_pop(&self) -> Option<Arc<Task>> {
        self.tasks.lock().expect("task queue lock").pop_front()
    }

    /// Pop, waiting at most `timeout` for a task to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<Arc<Task>> {
        let mut tasks = self.tasks.lock().expect("task queue lock");
        if tasks.is_empty() {
            tasks = self
                .cv
                .wait_timeout(tasks, timeout)
                .expect("task queue condvar wait")
                .0;
        }
        tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().expect("task queue lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wake every worker blocked on this queue.
    pub fn notify_all(&self) {
        let _guard = self.tasks.lock().expect("task queue lock");
        self.cv.notify_all();
    }
}
