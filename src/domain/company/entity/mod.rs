pub mod company;
pub mod company_file;
