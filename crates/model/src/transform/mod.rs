pub mod flatten_spec;
