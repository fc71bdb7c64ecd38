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
use std::sync::Arc;

use crate::runtime::current_scheduler::SchedulerHandle;
use crate::runtime::task::TaskContext;
use crate::runtime::worker::Worker;
use crate::storage::registry::TableRegistry;

/// Everything an operator needs to execute: the tables, where to run tasks, and the worker it
/// is currently running on, if any.
#[derive(Clone)]
pub struct QueryContext {
    registry: Arc<TableRegistry>,
    scheduler: SchedulerHandle,
    worker: Option<Arc<Worker>>,
}

impl QueryContext {
    pub fn new(registry: Arc<TableRegistry>, scheduler: SchedulerHandle) -> Self {
        Self {
            registry,
            scheduler,
            worker: None,
        }
    }

    /// Context for operators executed from within a task.
    pub fn for_task(&self, ctx: &TaskContext) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            scheduler: ctx.scheduler.clone(),
            worker: ctx.worker.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<TableRegistry> {
        &self.registry
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }

    pub fn worker(&self) -> Option<&Arc<Worker>> {
        self.worker.as_ref()
    }
}
