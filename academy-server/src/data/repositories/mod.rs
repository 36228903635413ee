pub(crate) mod slot_post_repository;
