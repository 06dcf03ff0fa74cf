pub mod announcement;
pub mod patch;
pub mod teacher;
