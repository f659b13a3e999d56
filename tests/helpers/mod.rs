//! Test helpers shared across the integration test binaries
//!
//! Each test binary pulls in this module, so not every helper is used
//! everywhere.
#![allow(dead_code)]

pub mod database_helper;
pub mod mail_mock;
pub mod test_data;

pub use database_helper::TestDatabase;
pub use mail_mock::MailGatewayMock;
