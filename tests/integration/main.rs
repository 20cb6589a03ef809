//! Integration tests for Vaga-Harvest

mod harvest_tests;
mod stubs;
mod wiremock_tests;
