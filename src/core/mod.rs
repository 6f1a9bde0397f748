pub mod disposition;
pub mod orchestrator;
pub mod sampler;
