//! Ordered step execution with typed hand-off between steps.
//!
//! A node that runs a fixed list of steps describes them as a
//! [`StepSequence`]: an enum of steps, the order they run in, and a slots
//! struct that carries one step's output to the next step's input.
//! [`run_sequence`] drives the steps and stops at the first failure.

use std::fmt;

use crate::context::EvalContext;
use crate::error::EvalError;

/// A fixed, ordered list of steps over shared slots.
pub trait StepSequence {
    /// One step. `Display` gives the name used in errors and logs.
    type Step: Copy + fmt::Debug + fmt::Display + 'static;

    /// Typed values threaded from step to step.
    type Slots;

    /// Every step, in the order it must run.
    fn steps(&self) -> &'static [Self::Step];

    /// Run one step, reading its inputs from and writing its outputs to
    /// `slots`.
    fn run_step(
        &self,
        step: Self::Step,
        ctx: &dyn EvalContext,
        slots: &mut Self::Slots,
    ) -> Result<(), EvalError>;
}

/// Run every step of `sequence` in order.
///
/// The first failing step ends the sequence; its error comes back wrapped in
/// [`EvalError::Step`] naming the step.
pub fn run_sequence<S: StepSequence>(
    sequence: &S,
    ctx: &dyn EvalContext,
    slots: &mut S::Slots,
) -> Result<(), EvalError> {
    for &step in sequence.steps() {
        tracing::trace!(%step, "running step");
        sequence
            .run_step(step, ctx, slots)
            .map_err(|source| EvalError::Step {
                step: step.to_string(),
                source: Box::new(source),
            })?;
    }
    Ok(())
}
