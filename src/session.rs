pub(crate) mod migration_session;
pub(crate) mod rule;
pub(crate) mod selection;
pub(crate) mod view;
