pub mod navigation;
pub mod search;
pub mod status;

pub use navigation::*;
pub use search::*;
pub use status::*;
