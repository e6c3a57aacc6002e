mod workout;
pub use workout::*;

mod entry;
pub use entry::*;
