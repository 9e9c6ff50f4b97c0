pub mod resumes;
pub mod versions;
