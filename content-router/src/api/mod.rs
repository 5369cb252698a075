pub mod content;
pub mod identity;
pub mod params;
pub mod utils;
