// Library for tests to access modules

pub mod aggregator;
pub mod collector;
pub mod config;
pub mod consumer;
pub mod models;
pub mod publisher;
pub mod store;
pub mod version;
pub mod worker;
