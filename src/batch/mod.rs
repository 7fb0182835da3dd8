pub(crate) mod job;
pub(crate) mod run;
pub(crate) mod session;
