pub mod commands;
pub mod runtime;
pub mod star_image;
