use derive_builder::Builder;

use crate::{
    bbot::BbotConfig,
    softspoken::{CSP, SSP},
    vsot::VsotConfig,
    BatchSize, SessionId,
};

/// SoftSpokenOT configuration, which must be identical for both parties.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SoftSpokenConfig {
    /// The unique session id.
    #[builder(setter(into))]
    session_id: SessionId,
    /// The number of OT instances.
    width: usize,
    /// The number of blocks per message.
    #[builder(default = "1")]
    depth: usize,
}

impl SoftSpokenConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(session_id) = &self.session_id {
            if session_id.is_empty() {
                return Err("session id must not be empty".to_string());
            }
        }

        let width = self.width.unwrap_or(0);
        let depth = self.depth.unwrap_or(1);
        if width == 0 || depth == 0 {
            return Err("width and depth must be positive".to_string());
        }

        let slots = width
            .checked_mul(depth)
            .ok_or_else(|| "width * depth overflows".to_string())?;
        if slots % SSP != 0 {
            return Err(format!(
                "width * depth must be a multiple of {}, got {}",
                SSP, slots
            ));
        }

        Ok(())
    }
}

impl SoftSpokenConfig {
    /// Creates a new builder for SoftSpokenConfig.
    pub fn builder() -> SoftSpokenConfigBuilder {
        SoftSpokenConfigBuilder::default()
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

    /// Returns the configuration of the base OTs which seed the extension.
    ///
    /// The base OTs run under a session id derived from this one.
    pub fn base_config(&self) -> VsotConfig {
        VsotConfig::new_unchecked(self.session_id.derive("base"), CSP, 1)
    }

    /// Returns the configuration of BBOT base OTs which seed the extension.
    ///
    /// Same session and shape as [`base_config`](Self::base_config).
    pub fn bbot_base_config(&self) -> BbotConfig {
        BbotConfig::new_unchecked(self.session_id.derive("base"), CSP, 1)
    }
}
