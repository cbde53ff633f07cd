use crate::core::interfaces::ChunkRegistry;
use crate::core::models::ChunkMetadata;
use crate::utils::{Logger, Result};
use parking_lot::Mutex;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ChunkGroup {
    pub name: String,
    /// Output chunk name, e.g. `public/css/app`
    pub matcher_key: String,
    pub pattern: Regex,
    pub metadata: ChunkMetadata,
}

impl ChunkGroup {
    pub fn matches(&self, module_path: &str) -> bool {
        self.pattern.is_match(module_path)
    }

    fn to_cache_group(&self) -> Value {
        let chunks = if self.metadata.combine_all { "all" } else { "async" };
        json!({
            "name": self.matcher_key,
            "test": self.pattern.as_str(),
            "chunks": chunks,
            "enforce": self.metadata.force,
            "type": self.metadata.asset_kind,
        })
    }
}

#[derive(Debug, Default)]
struct ChunksState {
    runtime: bool,
    groups: Vec<ChunkGroup>,
}

/// In-memory split-chunk registry for one build
#[derive(Debug, Default)]
pub struct Chunks {
    state: Mutex<ChunksState>,
}

impl Chunks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runtime_enabled(&self) -> bool {
        self.state.lock().runtime
    }

    pub fn groups(&self) -> Vec<ChunkGroup> {
        self.state.lock().groups.clone()
    }

    /// Cache group keys: a name used once stays as is, repeated names get
    /// their matcher key appended so no group is overwritten.
    fn cache_groups(groups: &[ChunkGroup]) -> Map<String, Value> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for group in groups {
            *counts.entry(group.name.as_str()).or_insert(0) += 1;
        }

        let mut cache_groups = Map::new();
        for group in groups {
            let key = if counts[group.name.as_str()] > 1 {
                format!("{}-{}", group.name, group.matcher_key)
            } else {
                group.name.clone()
            };
            cache_groups.insert(key, group.to_cache_group());
        }
        cache_groups
    }
}

impl ChunkRegistry for Chunks {
    fn enable_runtime(&self) {
        self.state.lock().runtime = true;
    }

    fn add(
        &self,
        name: &str,
        matcher_key: &str,
        pattern: &str,
        metadata: ChunkMetadata,
    ) -> Result<()> {
        let pattern = Regex::new(pattern)?;

        Logger::debug(&format!("🧩 Chunk group {} → {}", name, matcher_key));

        self.state.lock().groups.push(ChunkGroup {
            name: name.to_string(),
            matcher_key: matcher_key.to_string(),
            pattern,
            metadata,
        });
        Ok(())
    }

    fn optimization(&self) -> Value {
        let state = self.state.lock();
        let mut optimization = Map::new();

        if state.runtime {
            optimization.insert("runtimeChunk".to_string(), json!({ "name": "manifest" }));
        }

        if !state.groups.is_empty() {
            optimization.insert(
                "splitChunks".to_string(),
                json!({ "cacheGroups": Self::cache_groups(&state.groups) }),
            );
        }

        Value::Object(optimization)
    }
}
