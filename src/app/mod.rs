pub mod runner;

pub use runner::{run_plan, run_plan_with, RunOptions};
