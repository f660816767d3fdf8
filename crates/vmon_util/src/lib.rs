pub mod space;
pub mod radix;
pub mod reg;
pub mod op;

pub use space::{Addr, MemSpace};
pub use radix::Radix;
pub use reg::Reg;
pub use op::{Op, Ops};
