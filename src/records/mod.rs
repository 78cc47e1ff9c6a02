pub(crate) mod extreme;
pub mod merger;
pub mod table;
pub mod tracker;
