mod common;
mod pipeline_tests;
mod plan_tests;
