pub mod animation;
pub mod combat;
pub mod entity;
pub mod tilemap;
