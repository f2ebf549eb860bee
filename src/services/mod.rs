pub mod fetcher;
pub mod pipeline;
pub mod publisher;
pub mod source;
pub mod storage;
pub mod thumbnail_service;
