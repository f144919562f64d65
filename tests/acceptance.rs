//! Cucumber runner for the notification acceptance suite.
//!
//! Exercises a live cygnus connector against a live hadoop cluster, so the
//! binary is gated behind the `acceptance` feature and skipped by a plain
//! `cargo test`. Point the suite at a deployment with a properties file
//! named by `CYGNUS_ACCEPTANCE_PROPERTIES`.


#[path = "steps/notification_steps.rs"]
mod steps;

use cucumber::World;
use world::NotificationWorld;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    NotificationWorld::run("tests/features/notifications.feature").await;
}
