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
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static CONFIG: OnceLock<FerroscanConfig> = OnceLock::new();

fn default_log_level() -> String {
    "info".to_string()
}

pub fn init_from_path(path: impl AsRef<Path>) -> Result<&'static FerroscanConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = path.as_ref().to_path_buf();
    let cfg = FerroscanConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    CONFIG
        .get()
        .ok_or_else(|| anyhow!("config was not installed"))
}

pub fn init_from_env_or_default() -> Result<&'static FerroscanConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = config_path_from_env_or_default()?;
    init_from_path(path)
}

pub fn config() -> Result<&'static FerroscanConfig> {
    init_from_env_or_default()
}

fn config_path_from_env_or_default() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("FERROSCAN_CONFIG")
        && !p.trim().is_empty()
    {
        return Ok(PathBuf::from(p));
    }

    let candidate = PathBuf::from("ferroscan.toml");
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(anyhow!(
        "missing config file: set $FERROSCAN_CONFIG or create ./ferroscan.toml"
    ))
}

#[derive(Clone, Debug, Deserialize)]
pub struct FerroscanConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional full tracing EnvFilter expression.
    /// If set, this takes precedence over `log_level`.
    /// Example: "ferroscan=debug,ferroscan::runtime=info"
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub debug: DebugSection,
}

impl FerroscanConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("parse toml: {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: FerroscanConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.node_queues == 0 {
            return Err(anyhow!("scheduler.node_queues must be at least 1"));
        }
        if self.storage.max_chunk_size == 0 {
            return Err(anyhow!("storage.max_chunk_size must be at least 1"));
        }
        Ok(())
    }
}

impl Default for FerroscanConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_filter: None,
            scheduler: SchedulerSection::default(),
            storage: StorageSection::default(),
            debug: DebugSection::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Number of task queues. Workers are spread round-robin across them and a task can
    /// name a preferred queue when it is scheduled.
    #[serde(default = "default_node_queues")]
    pub node_queues: usize,
    #[serde(default)]
    pub pin_workers: bool,
    /// How long an idle worker parks on its queue before it re-checks shutdown and
    /// stealable work.
    #[serde(default = "default_idle_wait_us")]
    pub idle_wait_us: u64,
}

fn default_worker_threads() -> usize {
    0 // 0 means use CPU cores
}

fn default_node_queues() -> usize {
    1
}

fn default_idle_wait_us() -> u64 {
    1000
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            node_queues: default_node_queues(),
            pin_workers: false,
            idle_wait_us: default_idle_wait_us(),
        }
    }
}

impl SchedulerSection {
    /// Get the actual number of worker threads.
    /// Returns CPU cores if configured as 0.
    pub fn actual_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

fn default_max_chunk_size() -> usize {
    65_535
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DebugSection {
    /// Log the chosen scan implementation and the predicate for every table scan.
    #[serde(default)]
    pub log_scan_strategy: bool,
}
