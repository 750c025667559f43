mod api;
mod error;
mod page;

pub use api::*;
pub use error::*;
pub use page::*;
