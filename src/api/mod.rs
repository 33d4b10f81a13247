pub mod upstash_api;

pub use upstash_api::UpstashApi;
