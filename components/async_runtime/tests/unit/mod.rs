//! Unit tests for the async runtime

mod event_loop_test;
mod reaction_test;
