pub(crate) mod confirm;
