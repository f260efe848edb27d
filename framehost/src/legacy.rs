//! Deprecated entry points kept for old hosts.
//!
//! `callJS` predates `receiveTasks` and behaves exactly like it. Do not add
//! new call sites.

use serde_json::Value;
use tracing::warn;

use crate::dispatch::{Entry, InstanceMethod, MethodTable};
use crate::error::HostResult;
use crate::runtime::Runtime;

pub const LEGACY_ALIASES: &[(&str, InstanceMethod)] = &[("callJS", InstanceMethod::ReceiveTasks)];

pub(crate) fn register_aliases(table: &mut MethodTable) {
    for (alias, target) in LEGACY_ALIASES {
        if !table.define(alias, Entry::Instance(*target)) {
            warn!(alias = %alias, target = target.name(), "legacy alias not registered");
        }
    }
}

impl Runtime {
    #[deprecated(since = "0.1.0", note = "use `receive_tasks`")]
    pub fn call_js(&mut self, id: &str, tasks: &Value) -> HostResult<Value> {
        self.receive_tasks(id, tasks)
    }
}
