pub mod action;
pub mod changed;
pub mod cli;
pub mod combine;
pub mod coverage;
pub mod error;
pub mod github;
pub mod model;
pub mod parsers;
pub mod render;
