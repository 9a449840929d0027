pub mod check_addendum;
pub mod grade;
pub mod init;
pub mod inspect;
