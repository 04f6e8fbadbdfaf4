pub mod attendance;
pub mod company;
pub mod employee;
pub mod holiday;
pub mod leave;
pub mod payroll;
pub mod role;
pub mod work_schedule;
