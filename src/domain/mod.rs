pub mod contact;
pub mod email;
pub mod industry;
pub mod lead;
pub mod search_result;
pub mod search_session;
