// tests/support/mocks/mod.rs
//! テストサポートモック再エクスポートモジュール
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod configuration;
pub mod time;
pub mod util;

// 時刻関連
pub use time::{DummyClock, fixed_now};

// 設定関連
pub use configuration::CountingConfiguration;

// 文字列変換
pub use util::{DummyTransliterator, UppercaseTransliterator};
