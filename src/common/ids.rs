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
use std::fmt;
use std::str::FromStr;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $repr:ty, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
        pub struct $name(pub $repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }

            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<usize> for $name {
            type Error = String;

            fn try_from(value: usize) -> Result<Self, Self::Error> {
                let v = <$repr>::try_from(value)
                    .map_err(|_| format!("{} out of range: {}", $label, value))?;
                Ok(Self(v))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let v = s
                    .parse::<$repr>()
                    .map_err(|e| format!("invalid {} string '{}': {}", $label, s, e))?;
                Ok(Self(v))
            }
        }
    };
}

define_id!(
    /// Index of a table inside the `TableRegistry` arena.
    TableId,
    u32,
    "table id"
);
define_id!(
    /// Ordinal of a chunk within its table. Dense and stable for the lifetime of the table.
    ChunkId,
    u32,
    "chunk id"
);
define_id!(
    /// Row offset inside a chunk.
    ChunkOffset,
    u32,
    "chunk offset"
);
define_id!(ColumnId, u16, "column id");
define_id!(
    /// Placeholder id of a prepared-statement parameter.
    ParameterId,
    u16,
    "parameter id"
);
define_id!(WorkerId, u32, "worker id");
define_id!(
    /// Task queue id. One queue per (NUMA) node.
    NodeId,
    u32,
    "node id"
);
define_id!(CpuId, u32, "cpu id");
define_id!(TaskId, u64, "task id");

impl ChunkId {
    pub const INVALID: ChunkId = ChunkId(u32::MAX);
}

impl ChunkOffset {
    pub const INVALID: ChunkOffset = ChunkOffset(u32::MAX);
}
