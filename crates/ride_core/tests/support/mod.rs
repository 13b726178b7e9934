pub mod fixtures;
pub mod surfaces;
