pub mod configuration;
pub mod fixture;
pub mod metadata;
pub mod time;
pub mod unit_of_work;
pub mod util;
