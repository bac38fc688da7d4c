pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod fetcher;
pub mod logging;
pub mod marker;
pub mod parser;
pub mod record;
pub mod xlsx_writer;
