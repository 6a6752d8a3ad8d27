//! Offline, CPU-only transforms over already-fetched data.

pub mod link_matrix;
pub mod redirects;
pub mod text;
