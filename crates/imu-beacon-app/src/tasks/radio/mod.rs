mod beacon;
pub(crate) mod neighbors;
pub(crate) mod receive;
mod restart;
mod transmit;

pub use beacon::*;
pub use neighbors::*;
pub use receive::*;
pub use restart::*;
pub use transmit::*;
