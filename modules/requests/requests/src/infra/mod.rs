pub mod directory;
pub mod files;
pub mod storage;
