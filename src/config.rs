//! Configuration for smcutil
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for an SMC session
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Transport Configuration
    // -------------------------------------------------------------------------
    /// IOKit service class matched when opening the controller
    pub service_name: String,

    /// User-client method selector used for every key transaction.
    /// The sub-operation travels inside the frame, not in the selector.
    pub kernel_index: u32,

    // -------------------------------------------------------------------------
    // Write Configuration
    // -------------------------------------------------------------------------
    /// Reject writes whose size differs from the controller's declared size.
    /// When false the declared size silently replaces the caller's.
    pub strict_write_size: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "AppleSMC".to_string(),
            kernel_index: 2,
            strict_write_size: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the IOKit service name
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Set the user-client method selector
    pub fn kernel_index(mut self, index: u32) -> Self {
        self.config.kernel_index = index;
        self
    }

    /// Fail writes whose size mismatches the key's declared size
    pub fn strict_write_size(mut self, strict: bool) -> Self {
        self.config.strict_write_size = strict;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
