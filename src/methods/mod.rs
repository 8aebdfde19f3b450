mod mardia;
mod scatter;
mod wilks;

pub use mardia::{MardiaComputation, mardia};
pub use scatter::{GroupMeans, GroupedSample, ScatterMatrices};
pub use wilks::{WilksComputation, manova, wilks_lambda};
