pub mod handle;
pub mod inverted;
pub mod posting;
