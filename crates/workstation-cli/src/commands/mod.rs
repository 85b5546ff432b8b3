pub mod bundle;
pub mod notebook;
pub mod run;
pub mod session;
