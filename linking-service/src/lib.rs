//! linking-service: links imported recurring donation pledges to Stripe
//! subscriptions so future charges collect automatically.
pub mod config;
pub mod models;
pub mod services;
