//! Fixed-capacity weighted behavior request list.
//!
//! One buffer is reused for every agent and every tick: it is cleared before
//! each decision and never grows past its initial capacity.

use tracing::trace;

use wingman_core::constants::MAX_BEHAVIOR_REQUESTS;

use crate::steering::{BehaviorKind, BehaviorRequest, TargetDescriptor};

/// Ordered request list. Index 0 is the highest priority.
#[derive(Debug)]
pub struct RequestBuffer {
    requests: Vec<BehaviorRequest>,
}

impl Default for RequestBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuffer {
    pub fn new() -> Self {
        Self {
            requests: Vec::with_capacity(MAX_BEHAVIOR_REQUESTS),
        }
    }

    /// Append a request at the next-lower priority. Negative or non-finite
    /// weights are stored as zero. Returns `false` when the buffer is full.
    pub fn push(&mut self, kind: BehaviorKind, target: TargetDescriptor, weight: f64) -> bool {
        if self.requests.len() >= MAX_BEHAVIOR_REQUESTS {
            trace!(?kind, "behavior request dropped, buffer full");
            return false;
        }
        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        };
        self.requests.push(BehaviorRequest {
            kind,
            target,
            weight,
        });
        true
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }

    pub fn as_slice(&self) -> &[BehaviorRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.requests.len() >= MAX_BEHAVIOR_REQUESTS
    }

    pub fn capacity(&self) -> usize {
        self.requests.capacity()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;

    #[test]
    fn test_push_refuses_past_capacity() {
        let mut buffer = RequestBuffer::new();
        let capacity = buffer.capacity();
        let accepted = (0..MAX_BEHAVIOR_REQUESTS + 3)
            .filter(|_| buffer.push(BehaviorKind::Seek, TargetDescriptor::None, 1.0))
            .count();

        assert_eq!(accepted, MAX_BEHAVIOR_REQUESTS);
        assert_eq!(buffer.len(), MAX_BEHAVIOR_REQUESTS);
        assert!(buffer.is_full());
        assert_eq!(buffer.capacity(), capacity);

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_bad_weights_stored_as_zero() {
        let mut buffer = RequestBuffer::new();
        let target = TargetDescriptor::Position(DVec3::X);
        buffer.push(BehaviorKind::Seek, target, -2.0);
        buffer.push(BehaviorKind::Flee, target, f64::NAN);
        buffer.push(BehaviorKind::Arrival, target, f64::INFINITY);
        buffer.push(BehaviorKind::Pursue, target, 0.5);

        let weights: Vec<f64> = buffer.as_slice().iter().map(|r| r.weight).collect();
        assert_eq!(weights, vec![0.0, 0.0, 0.0, 0.5]);
        assert!(matches!(buffer.as_slice()[3].kind, BehaviorKind::Pursue));
    }
}
