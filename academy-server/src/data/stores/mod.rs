pub(crate) mod file;
pub(crate) mod memory;
pub(crate) mod postgres;
