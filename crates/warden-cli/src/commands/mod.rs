pub mod catalog;
pub mod dispatch;
pub mod init;
pub mod metrics;
pub mod report;
pub mod rule;
pub mod shared;
pub mod validate;
pub mod violation;
