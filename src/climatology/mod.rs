pub mod builder;
pub mod windows;
