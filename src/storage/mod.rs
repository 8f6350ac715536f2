pub mod blob;
pub mod checkpoint;
pub mod layout;
pub mod wal;
