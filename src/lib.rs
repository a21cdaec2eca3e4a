pub mod bench;
pub mod core;
pub mod neuro;
