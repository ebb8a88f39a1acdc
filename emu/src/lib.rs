mod machine;

pub use machine::{LoadError, Machine, RAM_SIZE};
