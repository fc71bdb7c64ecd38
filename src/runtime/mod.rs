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
pub mod current_scheduler;
pub mod query_context;
pub mod scheduler;
pub mod task;
pub mod task_queue;
pub mod worker;

pub use current_scheduler::SchedulerHandle;
pub use query_context::QueryContext;
pub use scheduler::{NodeQueueScheduler, SchedulerConfig};
pub use task::{Task, TaskContext, TaskState};
