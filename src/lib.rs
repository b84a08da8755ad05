pub mod cli;
pub mod encoder;
pub mod generator;
pub mod model;
pub mod output;
pub mod parser;
pub mod settings;
pub mod subscription;
pub mod util;
