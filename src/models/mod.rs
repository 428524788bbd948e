pub mod event;
pub mod outcome;
pub mod summary;
pub mod test_run;

pub use event::*;
pub use outcome::*;
pub use summary::*;
pub use test_run::*;
