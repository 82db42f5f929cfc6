//! Connectivity signal contract
//!
//! Delivered asynchronously by whatever path monitor the platform offers;
//! the state machine only distinguishes satisfied from unsatisfied.

/// Network path status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    /// The network path can carry traffic
    Satisfied,

    /// The network path is down or unusable
    Unsatisfied,
}

impl NetworkStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, NetworkStatus::Satisfied)
    }
}
