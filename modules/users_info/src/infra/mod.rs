pub mod docdb;
pub mod ids;
pub mod storage;
