pub mod audit_log;
pub mod employee;
pub mod overtime;
pub mod payroll;
pub mod traffic_fine;
