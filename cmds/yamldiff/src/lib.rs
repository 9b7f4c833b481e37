//! Reorder the documents of two Kubernetes manifest bundles so matching
//! resources line up, then compare the normalized bundles.

pub mod commands;
pub mod compare;
pub mod reorder;
pub mod stable_sort;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
pub mod writer;
pub mod yaml;
