pub mod lead_gateway;
pub mod openai_client;
pub mod search_coordinator;
pub mod search_provider;
pub mod search_runner;

pub use lead_gateway::*;
pub use openai_client::*;
pub use search_coordinator::*;
pub use search_provider::*;
pub use search_runner::*;
