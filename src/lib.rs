pub mod config;
pub mod logger;
pub mod text_utils;
pub mod xml_tree;
pub mod file_name;
pub mod post;
pub mod content;
pub mod output;
pub mod import;
pub mod runner;
mod test_data;
