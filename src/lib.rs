pub mod cache;
pub mod channel;
pub mod config;
pub mod epg;
pub mod errors;
pub mod matching;
pub mod scores;
pub mod xmltv_time;
