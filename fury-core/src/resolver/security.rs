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

use std::collections::HashSet;
use std::sync::RwLock;

use log::warn;

/// Decides whether a type may be serialized or deserialized.
///
/// The type resolver consults the checker on every lookup, on both the write
/// and the read path, so a type rejected at runtime is blocked immediately.
pub trait SecurityChecker: Send + Sync {
    fn is_allowed(&self, type_name: &str) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckLevel {
    /// Every type is accepted.
    Disable,
    /// Disallowed types are rejected; types outside the allow list are
    /// accepted with a warning.
    Warn,
    /// Only allow-listed types that are not disallowed are accepted.
    Strict,
}

#[derive(Default)]
struct Lists {
    allow: HashSet<String>,
    allow_prefixes: HashSet<String>,
    disallow: HashSet<String>,
    disallow_prefixes: HashSet<String>,
}

impl Lists {
    fn matches(names: &HashSet<String>, prefixes: &HashSet<String>, type_name: &str) -> bool {
        names.contains(type_name) || prefixes.iter().any(|p| type_name.starts_with(p.as_str()))
    }

    fn is_allow_listed(&self, type_name: &str) -> bool {
        Self::matches(&self.allow, &self.allow_prefixes, type_name)
    }

    fn is_disallowed(&self, type_name: &str) -> bool {
        Self::matches(&self.disallow, &self.disallow_prefixes, type_name)
    }
}

/// Allow/deny list checker. Entries ending in `*` match by prefix.
///
/// ```rust
/// use fury_core::resolver::security::{AllowListChecker, CheckLevel, SecurityChecker};
///
/// let checker = AllowListChecker::new(CheckLevel::Strict);
/// checker.allow("demo.*");
/// assert!(checker.is_allowed("demo.Point"));
/// checker.disallow("demo.Point");
/// assert!(!checker.is_allowed("demo.Point"));
/// assert!(!checker.is_allowed("other.Point"));
/// ```
pub struct AllowListChecker {
    level: CheckLevel,
    lists: RwLock<Lists>,
}

fn split_pattern(pattern: &str) -> (bool, &str) {
    match pattern.strip_suffix('*') {
        Some(prefix) => (true, prefix),
        None => (false, pattern),
    }
}

impl AllowListChecker {
    pub fn new(level: CheckLevel) -> AllowListChecker {
        AllowListChecker {
            level,
            lists: RwLock::default(),
        }
    }

    pub fn level(&self) -> CheckLevel {
        self.level
    }

    pub fn allow(&self, pattern: &str) {
        let (is_prefix, name) = split_pattern(pattern);
        if let Ok(mut lists) = self.lists.write() {
            if is_prefix {
                lists.disallow_prefixes.remove(name);
                lists.allow_prefixes.insert(name.to_string());
            } else {
                lists.disallow.remove(name);
                lists.allow.insert(name.to_string());
            }
        }
    }

    pub fn disallow(&self, pattern: &str) {
        let (is_prefix, name) = split_pattern(pattern);
        if let Ok(mut lists) = self.lists.write() {
            if is_prefix {
                lists.allow_prefixes.remove(name);
                lists.disallow_prefixes.insert(name.to_string());
            } else {
                lists.allow.remove(name);
                lists.disallow.insert(name.to_string());
            }
        }
    }

    /// Removes an allow-list entry without adding it to the disallow list.
    ///
    /// Under `Strict` this rejects the type from the next lookup on.
    pub fn revoke(&self, pattern: &str) {
        let (is_prefix, name) = split_pattern(pattern);
        if let Ok(mut lists) = self.lists.write() {
            if is_prefix {
                lists.allow_prefixes.remove(name);
            } else {
                lists.allow.remove(name);
            }
        }
    }
}

impl SecurityChecker for AllowListChecker {
    fn is_allowed(&self, type_name: &str) -> bool {
        if self.level == CheckLevel::Disable {
            return true;
        }
        // A poisoned lock fails closed.
        let Ok(lists) = self.lists.read() else {
            return false;
        };
        if lists.is_disallowed(type_name) {
            return false;
        }
        if lists.is_allow_listed(type_name) {
            return true;
        }
        match self.level {
            CheckLevel::Strict => false,
            _ => {
                warn!(
                    "Type {} isn't in the allow list for serialization. Add it with \
                     AllowListChecker::allow if it is trusted, or use CheckLevel::Strict \
                     to reject unlisted types.",
                    type_name
                );
                true
            }
        }
    }
}
