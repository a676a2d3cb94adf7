// Environment models answering traversability queries

pub mod voxel_map;

pub use voxel_map::*;
