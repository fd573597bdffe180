pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod html;
pub mod nutrition;
pub mod portion;
pub mod search;
pub mod slug;
pub mod value;

pub use client::NutritionClient;
pub use error::{GiziError, Result};
