//! Cyclic module interface
//!
//! A cyclic module is initialised once and then processed once per control cycle by the
//! executable's main loop. Inputs which arrive asynchronously (over the network for example) do
//! not go through this interface, modules expose their own handles for those.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module driven by the control loop.
pub trait State {
    /// Passed to `init`
    type InitData;
    type InitError;

    /// Passed to `proc` every cycle
    type InputData;
    /// Produced by `proc` every cycle
    type OutputData;
    /// Summary of what `proc` did this cycle, for logging and tests
    type StatusReport;
    type ProcError;

    /// Prepare the module for its first cycle.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle.
    ///
    /// An error refuses this cycle only: the module must be ready to process the next one.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
