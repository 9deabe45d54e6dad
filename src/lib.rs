//! Dompet - personal finance tracking in Rupiah
//!
//! This library provides the core of the Dompet command-line application:
//! income and expense tracking, monthly category budgets, savings goals,
//! recurring bills with reminders, and an AI assistant that records
//! transactions from conversation, free text or receipt photos.
//!
//! # Architecture
//!
//! - `config`: paths and user settings
//! - `error`: the crate error type
//! - `models`: money, months, transactions, budgets, goals, bills, notifications
//! - `storage`: JSON file storage
//! - `services`: business logic on top of storage
//! - `audit`: append-only audit log
//! - `backup`: rolling backups and restore
//! - `export`: CSV, JSON, YAML and markdown output
//! - `reports`: monthly and spending reports
//! - `ai`: Gemini chat with tool calling, OpenRouter parsing
//! - `display` and `cli`: terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use dompet::config::{paths::DompetPaths, settings::Settings};
//! use dompet::storage::Storage;
//!
//! let paths = DompetPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let mut storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod ai;
pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::DompetError;
