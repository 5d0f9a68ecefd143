pub mod assets;
pub mod markdown;
