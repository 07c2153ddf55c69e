pub mod exec;
pub mod iwconfig;
pub mod scrape;
pub mod traits;
