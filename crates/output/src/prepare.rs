//! Struct cleanup that runs right before mapping

use unisdk_core::config::DEFAULT_SYNTHETIC_ROOTS;
use unisdk_core::EngineStruct;

/// Methods that only exist as reflection plumbing in the source runtime
pub const REFLECTION_ARTIFACTS: &[&str] = &["GetTypeInfo", "GetKlass"];

/// Strips synthetic bases and reflection accessors from structs
#[derive(Debug, Clone)]
pub struct StructPreparer {
    synthetic_roots: Vec<String>,
}

impl Default for StructPreparer {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_ROOTS.iter().map(|s| s.to_string()))
    }
}

impl StructPreparer {
    pub fn new(synthetic_roots: impl IntoIterator<Item = String>) -> Self {
        Self {
            synthetic_roots: synthetic_roots.into_iter().collect(),
        }
    }

    /// Clean `s` in place. Never fails; no match is a no-op.
    pub fn prepare(&self, s: &mut EngineStruct) {
        let synthetic_key = s
            .primary_super()
            .filter(|(_, base)| self.synthetic_roots.iter().any(|root| root == *base))
            .map(|(key, _)| key.clone());
        if let Some(key) = synthetic_key {
            s.supers.shift_remove(&key);
        }

        s.methods
            .retain(|m| !REFLECTION_ARTIFACTS.contains(&m.item.name.as_str()));
    }
}
