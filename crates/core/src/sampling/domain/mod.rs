pub mod sampling_plan;
pub mod traversal;
