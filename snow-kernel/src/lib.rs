/*!
Ordered typing contexts for bidirectional type checking with existential variables
*/

pub mod context;
pub mod display;
pub mod fresh;
pub mod log;
pub mod session;
pub mod term;

pub use context::*;
pub use fresh::*;
pub use log::*;
pub use session::*;
pub use term::*;
