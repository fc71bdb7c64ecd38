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
use crate::ferroscan_config::config as ferroscan_app_config;

pub(crate) fn scheduler_worker_threads() -> usize {
    ferroscan_app_config()
        .ok()
        .map(|c| c.scheduler.actual_worker_threads())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

pub(crate) fn scheduler_node_queues() -> usize {
    ferroscan_app_config()
        .ok()
        .map(|c| c.scheduler.node_queues.max(1))
        .unwrap_or(1)
}

pub(crate) fn scheduler_pin_workers() -> bool {
    ferroscan_app_config()
        .ok()
        .map(|c| c.scheduler.pin_workers)
        .unwrap_or(false)
}

pub(crate) fn scheduler_idle_wait_us() -> u64 {
    ferroscan_app_config()
        .ok()
        .map(|c| c.scheduler.idle_wait_us)
        .unwrap_or(1000)
}

pub(crate) fn storage_max_chunk_size() -> usize {
    ferroscan_app_config()
        .ok()
        .map(|c| c.storage.max_chunk_size)
        .unwrap_or(65_535)
}

pub(crate) fn debug_log_scan_strategy() -> bool {
    ferroscan_app_config()
        .ok()
        .map(|c| c.debug.log_scan_strategy)
        .unwrap_or(false)
}
