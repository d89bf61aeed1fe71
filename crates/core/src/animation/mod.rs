//! Position animators for the two playback modes plus the easing curves
//! they share.

pub mod continuous;
pub mod discrete;
pub mod easing;

pub use continuous::{travel_percent, ContinuousAnimator, FrameUpdate, KeyframePlan};
pub use discrete::{DiscreteAnimator, NavigationOutcome};
pub use easing::Easing;
