mod coordinator;

pub use coordinator::*;
