pub mod proxy;
pub mod transcript;

pub use proxy::*;
pub use transcript::*;
