pub mod admin;
pub mod logs;
pub mod rates;
pub mod scrape;
pub mod seed;
pub mod setup;
pub mod ui;
