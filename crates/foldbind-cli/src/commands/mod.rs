pub mod affinity;
pub mod pose;
pub mod poses;
pub mod structure;
