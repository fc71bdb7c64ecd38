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
//! Owner of all registered data tables.
//!
//! Tables live in an append-only arena indexed by `TableId`. Reference segments store the id
//! of the table they point into and resolve it here.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::common::ids::TableId;
use crate::ferroscan_logging::debug;
use crate::storage::table::{Table, TableKind};

#[derive(Default)]
struct RegistryInner {
    tables: Vec<Arc<Table>>,
    by_name: HashMap<String, TableId>,
}

#[derive(Default)]
pub struct TableRegistry {
    inner: RwLock<RegistryInner>,
}

impl TableRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a data table under `name`, assigning its id. Names are unique.
    pub fn register(&self, name: &str, mut table: Table) -> Result<Arc<Table>, String> {
        if table.kind() != TableKind::Data {
            return Err(format!("table '{name}' is not a data table"));
        }
        let mut guard = self
            .inner
            .write()
            .map_err(|_| "table registry lock poisoned".to_string())?;
        if guard.by_name.contains_key(name) {
            return Err(format!("table '{name}' already registered"));
        }
        let id = TableId::try_from(guard.tables.len())?;
        table.set_id(id);
        let table = Arc::new(table);
        guard.tables.push(Arc::clone(&table));
        guard.by_name.insert(name.to_string(), id);
        debug!(
            table_id = id.get(),
            name,
            chunks = table.chunk_count(),
            rows = table.row_count(),
            "registered table"
        );
        Ok(table)
    }

    pub fn get(&self, id: TableId) -> Result<Arc<Table>, String> {
        let guard = self
            .inner
            .read()
            .map_err(|_| "table registry lock poisoned".to_string())?;
        guard
            .tables
            .get(id.as_usize())
            .cloned()
            .ok_or_else(|| format!("unknown table id {id}"))
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<Table>> {
        let guard = self.inner.read().ok()?;
        let id = guard.by_name.get(name)?;
        guard.tables.get(id.as_usize()).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|g| {
                let mut names: Vec<String> = g.by_name.keys().cloned().collect();
                names.sort();
                names
            })
            .unwrap_or_default()
    }
}
