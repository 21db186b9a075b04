pub mod status;
pub mod order;
pub mod shelter;

pub use status::*;
pub use order::*;
pub use shelter::*;
