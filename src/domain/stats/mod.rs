pub mod model;
pub mod service;

pub use model::StatsSummary;
pub use service::{StatsService, StatsServiceApi};
