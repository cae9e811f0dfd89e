pub mod apply_engine;
