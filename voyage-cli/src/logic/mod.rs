pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::{ChoicePolicy, parse_policies};
pub use seeds::resolve_seed_inputs;
pub use simulation::{PolicyAggregate, SimulationConfig, VoyageRun, aggregate_runs, run_simulation};
