// src/application/ports/mod.rs
pub mod configuration;
pub mod time;
pub mod util;

// Type aliases to make port injection sites more descriptive and reduce `dyn` noise
pub type ClockPort = dyn time::Clock;
pub type TransliteratorPort = dyn util::Transliterator;
pub type SlugConfigurationPort = dyn configuration::SlugConfigurationSource;
