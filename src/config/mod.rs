//! Configuration for pipeline behavior.
//!
//! This module provides [`PipelineConfig`], which controls how records are
//! batched and how many workers process them.
//!
//! # Example
//!
//! ```
//! use recpipe::PipelineConfig;
//!
//! // Custom worker count and batch size
//! let config = PipelineConfig::default()
//!     .with_num_workers(4)
//!     .with_batch_size(1000);
//!
//! config.validate()?;
//! # Ok::<(), recpipe::PipelineError>(())
//! ```

use crate::error::PipelineError;

/// Default number of records per batch in line mode.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default record separator in line mode.
pub const DEFAULT_RECORD_SEPARATOR: u8 = b'\n';

/// Configuration for a [`Pipeline`](crate::Pipeline).
///
/// `PipelineConfig` controls batching and worker-pool sizing. The record
/// separator and the skip-empty behavior only apply in line mode; when a
/// custom splitter is installed, batch sizing is governed by the splitter
/// itself and these knobs are ignored.
///
/// # Example
///
/// ```
/// use recpipe::PipelineConfig;
///
/// // Use defaults: one worker per core, 10k records per batch
/// let config = PipelineConfig::default();
///
/// // Builder pattern
/// let config = PipelineConfig::default()
///     .with_num_workers(8)
///     .with_record_separator(b'\t')
///     .with_skip_empty(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of worker threads.
    num_workers: usize,

    /// Records per batch in line mode.
    batch_size: usize,

    /// Record separator byte in line mode.
    record_separator: u8,

    /// Whether records with empty trimmed content are dropped before
    /// dispatch (line mode only).
    skip_empty: bool,
}

impl PipelineConfig {
    /// Creates a configuration with the given worker count and batch size.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if either value is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use recpipe::PipelineConfig;
    ///
    /// let config = PipelineConfig::new(4, 1000)?;
    /// assert_eq!(config.num_workers(), 4);
    /// # Ok::<(), recpipe::PipelineError>(())
    /// ```
    pub fn new(num_workers: usize, batch_size: usize) -> Result<Self, PipelineError> {
        let config = Self {
            num_workers,
            batch_size,
            record_separator: DEFAULT_RECORD_SEPARATOR,
            skip_empty: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the number of worker threads.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PipelineConfig::validate`] to check it.
    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    /// Sets the number of records per batch (line mode).
    ///
    /// Note: This does not validate the configuration. Use
    /// [`PipelineConfig::validate`] to check it.
    pub fn with_batch_size(mut self, n: usize) -> Self {
        self.batch_size = n;
        self
    }

    /// Sets the record separator byte (line mode).
    pub fn with_record_separator(mut self, sep: u8) -> Self {
        self.record_separator = sep;
        self
    }

    /// Sets whether empty records are dropped before dispatch (line mode).
    pub fn with_skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Returns the number of worker threads.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the number of records per batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the record separator byte.
    pub fn record_separator(&self) -> u8 {
        self.record_separator
    }

    /// Returns whether empty records are dropped before dispatch.
    pub fn skip_empty(&self) -> bool {
        self.skip_empty
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use recpipe::PipelineConfig;
    ///
    /// let config = PipelineConfig::default().with_num_workers(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.num_workers == 0 {
            return Err(PipelineError::InvalidConfig {
                message: "num_workers must be non-zero",
            });
        }
        if self.batch_size == 0 {
            return Err(PipelineError::InvalidConfig {
                message: "batch_size must be non-zero",
            });
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            record_separator: DEFAULT_RECORD_SEPARATOR,
            skip_empty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.num_workers() >= 1);
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.record_separator(), b'\n');
        assert!(config.skip_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::default()
            .with_num_workers(8)
            .with_batch_size(500)
            .with_record_separator(b'\0')
            .with_skip_empty(false);

        assert_eq!(config.num_workers(), 8);
        assert_eq!(config.batch_size(), 500);
        assert_eq!(config.record_separator(), 0);
        assert!(!config.skip_empty());
    }

    #[test]
    fn test_invalid_zero_workers() {
        assert!(PipelineConfig::new(0, 1000).is_err());
    }

    #[test]
    fn test_invalid_zero_batch_size() {
        assert!(PipelineConfig::new(4, 0).is_err());
    }
}
