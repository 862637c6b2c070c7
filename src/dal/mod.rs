pub mod email_db;
pub mod lead_db;
pub mod report_db;
pub mod search_session_db;
pub mod stat_db;
