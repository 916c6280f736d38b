mod export;
mod import;

pub use export::*;
pub use import::*;
