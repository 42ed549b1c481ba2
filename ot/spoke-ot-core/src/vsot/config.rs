use derive_builder::Builder;

use crate::{BatchSize, SessionId};

/// VSOT configuration, which must be identical for both parties.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct VsotConfig {
    /// The unique session id.
    #[builder(setter(into))]
    session_id: SessionId,
    /// The number of OT instances. Must be a positive multiple of 8.
    width: usize,
    /// The number of blocks per message.
    #[builder(default = "1")]
    depth: usize,
}

impl VsotConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(session_id) = &self.session_id {
            if session_id.is_empty() {
                return Err("session id must not be empty".to_string());
            }
        }

        if let Some(width) = self.width {
            if width == 0 || width % 8 != 0 {
                return Err(format!(
                    "width must be a positive multiple of 8, got {}",
                    width
                ));
            }
        }

        if self.depth == Some(0) {
            return Err("depth must be at least 1".to_string());
        }

        if let (Some(width), Some(depth)) = (self.width, self.depth) {
            if width.checked_mul(depth).is_none() {
                return Err("width * depth overflows".to_string());
            }
        }

        Ok(())
    }
}

impl VsotConfig {
    /// Creates a config from parameters known to be valid.
    pub(crate) fn new_unchecked(session_id: SessionId, width: usize, depth: usize) -> Self {
        Self {
            session_id,
            width,
            depth,
        }
    }

    /// Creates a new builder for VsotConfig.
    pub fn builder() -> VsotConfigBuilder {
        VsotConfigBuilder::default()
    }

    /// Returns the session id.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the number of OT instances.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of blocks per message.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> BatchSize {
        BatchSize::new(self.width, self.depth)
    }
}
