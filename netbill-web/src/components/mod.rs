pub(crate) mod access_guard;
pub(crate) mod loading;
pub(crate) mod record_table;
