pub mod derive;
pub mod holiday;
pub mod payroll;
pub mod policy;
pub mod schedule;
pub mod sweeper;
pub mod time;
