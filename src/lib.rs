/// Basic application code
pub mod app;
/// REST clients for outside services
pub mod client;
/// Sources of the current time
pub mod clock;
/// Controllers for REST endpoints
pub mod controller;
/// Domain objects
pub mod domain;
/// Application errors
pub mod error;
/// Stored records
pub mod model;
/// Reminder notification rules, delivery and scheduling
pub mod notification;
/// Repositories
pub mod repo;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
