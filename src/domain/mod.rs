pub mod actor;
pub mod tile;
pub mod vector;
