pub mod completion;
pub mod habit;
