pub mod employee;
pub mod overtime;
pub mod payroll_entry;
pub mod role;
pub mod traffic_fine;
