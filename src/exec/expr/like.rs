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
//! SQL `LIKE` matching. `%` matches any run of characters, `_` exactly one character.

use std::collections::HashMap;

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::datatypes::DataType;
use regex::Regex;

#[derive(Clone, Debug)]
enum LikePattern {
    Exact(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    Regex(Regex),
}

#[derive(Clone, Debug)]
pub struct LikeMatcher {
    pattern: LikePattern,
}

fn has_wildcard(s: &str) -> bool {
    s.contains(['%', '_'])
}

fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if c == '%' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

impl LikeMatcher {
    pub fn new(pattern: &str) -> Result<Self, String> {
        let pattern = if !has_wildcard(pattern) {
            LikePattern::Exact(pattern.to_string())
        } else if let Some(prefix) = pattern.strip_suffix('%')
            && !has_wildcard(prefix)
        {
            LikePattern::StartsWith(prefix.to_string())
        } else if let Some(suffix) = pattern.strip_prefix('%')
            && !has_wildcard(suffix)
        {
            LikePattern::EndsWith(suffix.to_string())
        } else if let Some(inner) = pattern
            .strip_prefix('%')
            .and_then(|p| p.strip_suffix('%'))
            && !has_wildcard(inner)
        {
            LikePattern::Contains(inner.to_string())
        } else {
            let regex = Regex::new(&like_to_regex(pattern))
                .map_err(|e| format!("invalid LIKE pattern '{}': {}", pattern, e))?;
            LikePattern::Regex(regex)
        };
        Ok(Self { pattern })
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.pattern {
            LikePattern::Exact(p) => text == p,
            LikePattern::StartsWith(p) => text.starts_with(p.as_str()),
            LikePattern::EndsWith(p) => text.ends_with(p.as_str()),
            LikePattern::Contains(p) => text.contains(p.as_str()),
            LikePattern::Regex(r) => r.is_match(text),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.pattern {
            LikePattern::Exact(_) => "exact",
            LikePattern::StartsWith(_) => "prefix",
            LikePattern::EndsWith(_) => "suffix",
            LikePattern::Contains(_) => "contains",
            LikePattern::Regex(_) => "regex",
        }
    }

    /// Row-wise match; NULL text stays NULL.
    pub fn matches_array(&self, values: &StringArray) -> BooleanArray {
        values.iter().map(|v| v.map(|s| self.matches(s))).collect()
    }
}

fn as_strings(array: &ArrayRef, what: &str) -> Result<Option<StringArray>, String> {
    match array.data_type() {
        DataType::Null => Ok(None),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .cloned()
            .map(Some)
            .ok_or_else(|| format!("like: {what} failed to downcast to StringArray")),
        _ => {
            let cast = arrow::compute::cast(array.as_ref(), &DataType::Utf8)
                .map_err(|e| format!("like: {what} cannot be read as string: {e}"))?;
            Ok(cast.as_any().downcast_ref::<StringArray>().cloned())
        }
    }
}

/// `text LIKE pattern` where both sides vary per row.
pub(crate) fn eval_like_arrays(
    text: &ArrayRef,
    pattern: &ArrayRef,
) -> Result<BooleanArray, String> {
    let len = text.len();
    let (Some(text), Some(pattern)) = (as_strings(text, "text")?, as_strings(pattern, "pattern")?)
    else {
        return Ok(BooleanArray::new_null(len));
    };
    let mut matchers: HashMap<String, LikeMatcher> = HashMap::new();
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        if text.is_null(i) || pattern.is_null(i) {
            out.push(None);
            continue;
        }
        let p = pattern.value(i);
        if !matchers.contains_key(p) {
            matchers.insert(p.to_string(), LikeMatcher::new(p)?);
        }
        let matched = matchers.get(p).map(|m| m.matches(text.value(i)));
        out.push(matched);
    }
    Ok(BooleanArray::from(out))
}
