// Library for tests to access modules

pub mod aggregation;
pub mod checker;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod maintenance_worker;
pub mod models;
pub mod routes;
pub mod timeline;
pub mod website_repo;
