pub mod executor;
pub mod loop_;
pub mod routine;

pub use executor::{StepExecutor, StepRunner};
pub use loop_::{
    ControlLoop, LoopOutcome, LoopReport, DEFAULT_MAX_ITERATIONS, EMPTY_OBJECTIVE_RESPONSE,
};
pub use routine::{run_fight_routine, RoutineParams};
