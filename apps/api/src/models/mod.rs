pub mod application;
pub mod cv;
pub mod roadmap;
