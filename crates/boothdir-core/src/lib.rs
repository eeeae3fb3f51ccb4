//! Dated save directories for photo booths: once per day, at a configurable
//! start time, the booth's save directory switches to a fresh
//! `YYYY-MM-DD_start-hour_HH-MM` folder, so a party running past midnight
//! keeps filling the previous day's folder.

pub mod config;
pub mod engine;
pub mod error;
pub mod paths;
pub mod suffix;
pub mod threshold;

pub use crate::config::{BoothConfig, OptionSpec};
pub use crate::engine::{DateFolderEngine, DiskSync, OnChangeMode};
pub use crate::error::{Error, Result};
pub use crate::paths::BaseDir;
pub use crate::threshold::Threshold;
