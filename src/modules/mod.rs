pub mod admin;
pub mod html;
pub mod public;
