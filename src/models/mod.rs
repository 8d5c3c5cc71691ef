pub mod compliance;
pub mod gear_log;
pub mod incident;
pub mod report;
pub mod site;
pub mod user;
pub mod worker;
