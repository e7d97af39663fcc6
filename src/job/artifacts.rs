use std::collections::HashMap;

/// Handle to an output buffer owned by an [`ArtifactRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(u64);

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "artifact#{}", self.0)
    }
}

/// Encoded output of a finished job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// `bytes.len()`, kept for reporting.
    pub byte_len: usize,
    /// Media type of `bytes`.
    pub media_type: &'static str,
}

impl OutputArtifact {
    /// Wrap encoded bytes.
    pub fn new(bytes: Vec<u8>, media_type: &'static str) -> Self {
        Self {
            byte_len: bytes.len(),
            bytes,
            media_type,
        }
    }
}

/// Live/lifetime counters of an [`ArtifactRegistry`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactStats {
    /// Artifacts currently held.
    pub live_artifacts: usize,
    /// Bytes currently held.
    pub live_bytes: usize,
    /// Artifacts ever acquired.
    pub acquired: u64,
    /// Artifacts ever released.
    pub released: u64,
}

/// Arena owning every output buffer handed out by the controller.
///
/// Buffers are created with [`ArtifactRegistry::acquire`] and only freed by an explicit
/// [`ArtifactRegistry::release`]; ids are never reused.
#[derive(Debug, Default)]
pub struct ArtifactRegistry {
    next_id: u64,
    live: HashMap<ArtifactId, OutputArtifact>,
    stats: ArtifactStats,
}

impl ArtifactRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `artifact` and return its handle.
    pub fn acquire(&mut self, artifact: OutputArtifact) -> ArtifactId {
        let id = ArtifactId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        self.stats.live_artifacts = self.stats.live_artifacts.saturating_add(1);
        self.stats.live_bytes = self.stats.live_bytes.saturating_add(artifact.byte_len);
        self.stats.acquired = self.stats.acquired.saturating_add(1);
        self.live.insert(id, artifact);
        id
    }

    /// Borrow a live artifact.
    pub fn get(&self, id: ArtifactId) -> Option<&OutputArtifact> {
        self.live.get(&id)
    }

    /// Free an artifact. Releasing an unknown or already released id is a no-op returning `None`.
    pub fn release(&mut self, id: ArtifactId) -> Option<OutputArtifact> {
        let artifact = self.live.remove(&id)?;
        self.stats.live_artifacts = self.stats.live_artifacts.saturating_sub(1);
        self.stats.live_bytes = self.stats.live_bytes.saturating_sub(artifact.byte_len);
        self.stats.released = self.stats.released.saturating_add(1);
        Some(artifact)
    }

    /// Release everything.
    pub fn clear(&mut self) {
        let ids: Vec<ArtifactId> = self.live.keys().copied().collect();
        for id in ids {
            self.release(id);
        }
    }

    /// Current counters.
    pub fn stats(&self) -> ArtifactStats {
        self.stats.clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/job/artifacts.rs"]
mod tests;
