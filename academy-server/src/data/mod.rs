pub(crate) mod kv_store;
pub(crate) mod post_repository;
pub(crate) mod repositories;
pub(crate) mod stores;
