//! Limits for codec-level decoding.

use schema::MAX_GENTITIES;

/// Codec-specific limits enforced while decoding untrusted input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecLimits {
    /// Maximum number of entities a packet entity list may decode to.
    pub max_packet_entities: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_packet_entities: MAX_GENTITIES as usize,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_packet_entities: 32,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_packet_entities: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_cover_every_entity() {
        let limits = CodecLimits::default();
        assert_eq!(limits.max_packet_entities, 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = CodecLimits::for_testing();
        let default_limits = CodecLimits::default();
        assert!(test_limits.max_packet_entities < default_limits.max_packet_entities);
    }

    #[test]
    fn unlimited_limits() {
        let limits = CodecLimits::unlimited();
        assert_eq!(limits.max_packet_entities, usize::MAX);
    }
}
