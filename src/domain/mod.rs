// Domain layer - Core labeling logic

pub mod cycle;
pub mod errors;
pub mod model;
pub mod recorder;
