#![allow(dead_code)]
pub mod dns_server_mock;
pub mod messages;

pub use dns_server_mock::{MockDnsServer, MockMode};
pub use messages::{answer_ips, build_query, parse};
