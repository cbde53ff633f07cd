mod build_tests;
mod registry_tests;
