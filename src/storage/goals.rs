//! Goal repository backed by goals.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DompetError;
use crate::models::{Goal, GoalId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_error;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GoalData {
    goals: Vec<Goal>,
}

/// Repository for savings goals
pub struct GoalRepository {
    path: PathBuf,
    data: RwLock<HashMap<GoalId, Goal>>,
}

impl GoalRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), DompetError> {
        let file_data: GoalData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_error)?;
        data.clear();
        for goal in file_data.goals {
            data.insert(goal.id, goal);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), DompetError> {
        let goals = self.get_all()?;
        write_json_atomic(&self.path, &GoalData { goals })
    }

    pub fn get(&self, id: GoalId) -> Result<Option<Goal>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.get(&id).cloned())
    }

    /// All goals, nearest target date first
    pub fn get_all(&self) -> Result<Vec<Goal>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        let mut goals: Vec<_> = data.values().cloned().collect();
        goals.sort_by(|a, b| {
            a.target_date
                .cmp(&b.target_date)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(goals)
    }

    /// Find a goal by name, ignoring case and surrounding whitespace
    pub fn find_by_name(&self, name: &str) -> Result<Option<Goal>, DompetError> {
        let needle = name.trim().to_lowercase();
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|g| g.name.trim().to_lowercase() == needle)
            .cloned())
    }

    /// Find a goal by short display ID
    pub fn find_by_short_id(&self, identifier: &str) -> Result<Option<Goal>, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data
            .values()
            .find(|g| g.id.matches_short(identifier))
            .cloned())
    }

    pub fn upsert(&self, goal: Goal) -> Result<(), DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        data.insert(goal.id, goal);
        Ok(())
    }

    pub fn delete(&self, id: GoalId) -> Result<Option<Goal>, DompetError> {
        let mut data = self.data.write().map_err(lock_error)?;
        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, DompetError> {
        let data = self.data.read().map_err(lock_error)?;
        Ok(data.len())
    }
}
