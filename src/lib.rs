// Chart panel core - a backend-agnostic chart lifecycle manager and the
// time-series transformation pipeline that feeds it.
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
