pub mod level_info;
pub mod map;
pub mod settings;
