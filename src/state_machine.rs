//! Entry-collection conversation state machine
//!
//! Pure transitions in the Elm style: `(state, event) -> (state, effects)`.
//! The runtime executes effects and feeds their outcomes back as events.

mod effect;
pub mod event;
pub mod prompts;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{ConvState, SessionContext};
pub use transition::{start, transition, TransitionError, TransitionResult};
