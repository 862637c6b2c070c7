mod app;

pub mod default_route;
pub mod industry_route;
pub mod lead_route;
pub mod report_route;
pub mod search_route;
pub mod stat_route;

pub use app::*;
