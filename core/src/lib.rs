pub mod dispatch;
pub mod queue;
pub mod supervisor;
pub mod watchdog;
pub mod worker;
