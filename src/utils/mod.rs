pub mod database;
pub mod extract;
pub mod pagination;
pub mod response;
pub mod storage;
pub mod validation;
