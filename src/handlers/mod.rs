pub mod pages;
pub mod protected;
pub mod public;
