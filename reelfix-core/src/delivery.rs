//! Delivery-size gate.
//!
//! The transport that forwards an artifact to the user caps file size. This
//! module only answers "does it fit"; what to do with an oversize artifact is
//! the front-end's call.

use crate::config::TransportMode;

const MIB: u64 = 1024 * 1024;

/// Largest artifact a self-hosted transport accepts.
pub const LOCAL_LIMIT_BYTES: u64 = 2000 * MIB;

/// Largest artifact a hosted transport accepts.
pub const HOSTED_LIMIT_BYTES: u64 = 50 * MIB;

/// Size ceiling for `transport`, in bytes.
#[must_use]
pub fn size_limit(transport: TransportMode) -> u64 {
    match transport {
        TransportMode::Local => LOCAL_LIMIT_BYTES,
        TransportMode::Hosted => HOSTED_LIMIT_BYTES,
    }
}

/// Short human label for the limit, e.g. `50MB`.
#[must_use]
pub fn limit_label(transport: TransportMode) -> String {
    format!("{}MB", size_limit(transport) / MIB)
}

/// Whether an artifact of `size_bytes` can be delivered over `transport`.
///
/// The limit itself is inclusive.
#[must_use]
pub fn fits(size_bytes: u64, transport: TransportMode) -> bool {
    size_bytes <= size_limit(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hosted_boundary() {
        assert!(fits(HOSTED_LIMIT_BYTES, TransportMode::Hosted));
        assert!(!fits(HOSTED_LIMIT_BYTES + 1, TransportMode::Hosted));
        assert!(fits(0, TransportMode::Hosted));
    }

    #[test]
    fn test_local_accepts_what_hosted_rejects() {
        let size = 120 * MIB;
        assert!(!fits(size, TransportMode::Hosted));
        assert!(fits(size, TransportMode::Local));
        assert!(!fits(LOCAL_LIMIT_BYTES + 1, TransportMode::Local));
    }

    #[test]
    fn test_mid_sized_files_by_transport() {
        assert!(!fits(60 * MIB, TransportMode::Hosted));
        assert!(fits(60 * MIB, TransportMode::Local));
        assert!(fits(40 * MIB, TransportMode::Hosted));
        assert!(fits(40 * MIB, TransportMode::Local));
    }

    #[test]
    fn test_labels() {
        assert_eq!(limit_label(TransportMode::Hosted), "50MB");
        assert_eq!(limit_label(TransportMode::Local), "2000MB");
    }
}
