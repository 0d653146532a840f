pub mod animation;
pub mod combat;
pub mod movement;
