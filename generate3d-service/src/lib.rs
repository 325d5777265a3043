//! HTTP service that turns generation parameters into a 3D model artifact
//! published in object storage.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
