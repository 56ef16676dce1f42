#![allow(dead_code)]

mod messages;
mod mock_upstream;

pub use messages::{
    build_query, build_query_with_checking_disabled, build_query_without_question,
    large_txt_answer, parse, upstream_answer,
};
pub use mock_upstream::MockUpstreamExchange;
