//! Chat history repository backed by chat_history.json

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::ai::{trim_history, ChatMessage};
use crate::error::DompetError;

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

/// Default number of messages kept on disk
pub const DEFAULT_HISTORY_LIMIT: usize = 40;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ChatHistoryData {
    messages: Vec<ChatMessage>,
}

/// Ordered conversation with the assistant
pub struct ChatHistoryRepository {
    path: PathBuf,
    messages: RwLock<Vec<ChatMessage>>,
    limit: AtomicUsize,
}

impl ChatHistoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            messages: RwLock::new(Vec::new()),
            limit: AtomicUsize::new(DEFAULT_HISTORY_LIMIT),
        }
    }

    /// Maximum number of messages written on save
    pub fn set_limit(&self, limit: usize) {
        self.limit.store(limit.max(1), Ordering::Relaxed);
    }

    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: ChatHistoryData = read_json(&self.path)?;
        let mut messages = self.messages.write().map_err(lock_error)?;
        *messages = file_data.messages;
        Ok(())
    }

    /// Trim to the limit and write to disk
    pub fn save(&self) -> Result<(), DompetError> {
        let mut messages = self.messages.write().map_err(lock_error)?;
        trim_history(&mut messages, self.limit.load(Ordering::Relaxed));
        write_json_atomic(
            &self.path,
            &ChatHistoryData {
                messages: messages.clone(),
            },
        )
    }

    pub fn get_all(&self) -> Result<Vec<ChatMessage>, DompetError> {
        let messages = self.messages.read().map_err(lock_error)?;
        Ok(messages.clone())
    }

    pub fn replace(&self, new_messages: Vec<ChatMessage>) -> Result<(), DompetError> {
        let mut messages = self.messages.write().map_err(lock_error)?;
        *messages = new_messages;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), DompetError> {
        self.replace(Vec::new())
    }

    pub fn count(&self) -> Result<usize, DompetError> {
        let messages = self.messages.read().map_err(lock_error)?;
        Ok(messages.len())
    }
}
