pub mod aggregate;
pub mod boxscore;
pub mod cache;
pub mod classify;
pub mod error;
pub mod event;
pub mod metrics;
pub mod momentum;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod synthetic;
pub mod xg;
