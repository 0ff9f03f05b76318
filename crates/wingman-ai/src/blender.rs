//! Behavior blending.
//!
//! Combines an ordered request list into one command. Both policies visit
//! requests in priority order and evaluate them lazily, so lower-priority
//! behaviors cost nothing once a winner is found. No state is carried from
//! one tick to the next.

use rand::Rng;

use wingman_core::enums::CombinerPolicy;
use wingman_core::types::SteeringCommand;

use crate::steering::BehaviorRequest;

/// The request that won this tick and its evaluated command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Priority index of the winning request.
    pub index: usize,
    pub command: SteeringCommand,
}

/// Pick one command from `requests` under `policy`.
///
/// `evaluate` turns a request into a command, or `None` when the behavior is
/// a no-op this tick (stale target, nothing to avoid). Returns `None` when no
/// request produced a command; callers fall back to idle.
///
/// `PrioritisedDithering` draws one number from `rng` per visited request
/// whose weight lies strictly between 0 and 1, so a fixed seed reproduces
/// the same choices.
pub fn blend<R, F>(
    requests: &[BehaviorRequest],
    policy: CombinerPolicy,
    rng: &mut R,
    mut evaluate: F,
) -> Option<Selection>
where
    R: Rng + ?Sized,
    F: FnMut(&BehaviorRequest) -> Option<SteeringCommand>,
{
    match policy {
        CombinerPolicy::PriorityOnly => requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.weight > 0.0)
            .find_map(|(index, r)| evaluate(r).map(|command| Selection { index, command })),
        CombinerPolicy::PrioritisedDithering => {
            let mut fallback = None;
            for (index, request) in requests.iter().enumerate() {
                if request.weight <= 0.0 {
                    continue;
                }
                let Some(command) = evaluate(request) else {
                    continue;
                };
                let selection = Selection { index, command };
                if request.weight >= 1.0 || rng.gen::<f64>() < request.weight {
                    return Some(selection);
                }
                fallback.get_or_insert(selection);
            }
            // Every draw missed: the highest-priority live request wins.
            fallback
        }
    }
}
