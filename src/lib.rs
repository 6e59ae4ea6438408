pub mod app;
pub mod async_task;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod graphql;
pub mod memo;
pub mod model;
pub mod navigation;
pub mod query;
pub mod screenshot;
pub mod search;
pub mod ui;

#[cfg(test)]
mod test_support;
