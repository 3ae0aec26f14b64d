//! Keyboard layout scoring and optimization engine: corpus-to-frequency
//! pipeline, n-gram statistic registry and scoring engine, and a parallel
//! simulated-annealing layout optimizer, over a fixed 3x12 key grid.

pub mod alphabet;
pub mod config;
pub mod corpus;
pub mod driver;
pub mod error;
pub mod grid;
pub mod layout;
pub mod optimizer;
pub mod reporting;
pub mod scoring;
pub mod stats;
pub mod weights;
