pub mod enemies;
pub mod params;
