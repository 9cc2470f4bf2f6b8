mod counter;
mod id;
mod lead;
mod page;

pub use counter::*;
pub use id::*;
pub use lead::*;
pub use page::*;
