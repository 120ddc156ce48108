pub(crate) mod rule_file;
