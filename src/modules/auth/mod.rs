pub mod middleware;
pub mod password;
pub mod routes;
pub mod service;
pub mod token;
