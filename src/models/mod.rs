pub mod customers;
pub mod ratings;
pub mod slides;

pub use customers::*;
pub use ratings::*;
pub use slides::*;
