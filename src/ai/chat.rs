//! Chat session: the tool-calling loop between the user, the model and the
//! data store

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::models::Notification;
use crate::services::NotificationService;
use crate::storage::Storage;

use super::prompt::build_system_prompt;
use super::tools::{ToolExecutor, ToolOutcome};
use super::types::{ChatMessage, ChatRequest, ToolResult};
use super::ChatModel;

/// Shown when the model keeps calling tools past the iteration budget
const GIVE_UP_TEXT: &str =
    "Maaf, saya belum bisa menyelesaikan permintaan ini. Coba jelaskan dengan kalimat yang lebih sederhana.";

/// The assistant's answer to one user message
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    /// Tool calls executed while answering, in order
    pub actions: Vec<ToolOutcome>,
    /// Notifications raised by data changes made during this turn
    pub notifications: Vec<Notification>,
}

impl ChatReply {
    pub fn changed_data(&self) -> bool {
        self.actions.iter().any(|a| a.mutated)
    }
}

pub struct ChatSession<'a, M: ChatModel> {
    model: M,
    storage: &'a Storage,
    settings: &'a Settings,
    today: NaiveDate,
}

impl<'a, M: ChatModel> ChatSession<'a, M> {
    pub fn new(model: M, storage: &'a Storage, settings: &'a Settings, today: NaiveDate) -> Self {
        storage.chat_history.set_limit(settings.ai.history_limit);
        Self {
            model,
            storage,
            settings,
            today,
        }
    }

    pub fn history(&self) -> DompetResult<Vec<ChatMessage>> {
        self.storage.chat_history.get_all()
    }

    /// Forget the conversation
    pub fn reset(&self) -> DompetResult<()> {
        self.storage.chat_history.clear()?;
        self.storage.chat_history.save()?;
        info!("chat history cleared");
        Ok(())
    }

    pub fn send(&self, user_text: &str) -> DompetResult<ChatReply> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(DompetError::Validation("Message is empty".to_string()));
        }

        let mut messages = self.storage.chat_history.get_all()?;
        messages.push(ChatMessage::user(user_text));

        let executor = ToolExecutor::new(self.storage, self.settings, self.today);
        let system = build_system_prompt(self.settings, self.today);
        let tools = ToolExecutor::declarations();

        let mut actions: Vec<ToolOutcome> = Vec::new();
        let mut interim_text: Option<String> = None;
        let mut final_text: Option<String> = None;

        for iteration in 0..self.settings.ai.max_tool_iterations.max(1) {
            let request = ChatRequest {
                system: system.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let reply = match self.model.generate(&request) {
                Ok(reply) => reply,
                Err(e) => {
                    // Keep a record of changes already made before surfacing the error
                    if !actions.is_empty() {
                        messages.push(ChatMessage::model_text(format!(
                            "(Percakapan terputus setelah {} aksi: {})",
                            actions.len(),
                            e
                        )));
                        self.persist(messages)?;
                    }
                    let raised = self.notify_if_changed(&actions)?;
                    if !raised.is_empty() {
                        info!(count = raised.len(), "notifications raised before model error");
                    }
                    return Err(e);
                }
            };

            if reply.calls.is_empty() {
                let text = reply.text.unwrap_or_default();
                messages.push(ChatMessage::model_text(text.clone()));
                final_text = Some(text);
                break;
            }

            debug!(iteration, calls = reply.calls.len(), "model requested tools");
            let mut results = Vec::with_capacity(reply.calls.len());
            for call in &reply.calls {
                let outcome = executor.execute(call);
                results.push(ToolResult {
                    name: outcome.name.clone(),
                    response: outcome.response.clone(),
                });
                actions.push(outcome);
            }

            if let Some(text) = reply.text.as_ref().filter(|t| !t.trim().is_empty()) {
                interim_text = Some(text.clone());
            }
            messages.push(ChatMessage::Model {
                text: reply.text,
                calls: reply.calls,
            });
            messages.push(ChatMessage::ToolResults { results });
        }

        let text = match final_text {
            Some(text) => text,
            None => {
                warn!(
                    limit = self.settings.ai.max_tool_iterations,
                    "tool iteration limit reached"
                );
                let text = interim_text.unwrap_or_else(|| GIVE_UP_TEXT.to_string());
                messages.push(ChatMessage::model_text(text.clone()));
                text
            }
        };

        let notifications = self.notify_if_changed(&actions)?;
        self.persist(messages)?;

        Ok(ChatReply {
            text,
            actions,
            notifications,
        })
    }

    fn notify_if_changed(&self, actions: &[ToolOutcome]) -> DompetResult<Vec<Notification>> {
        if !actions.iter().any(|a| a.mutated) {
            return Ok(Vec::new());
        }
        NotificationService::new(self.storage, &self.settings.notifications).generate(self.today)
    }

    fn persist(&self, messages: Vec<ChatMessage>) -> DompetResult<()> {
        self.storage.chat_history.replace(messages)?;
        self.storage.chat_history.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{FunctionCall, ModelReply};
    use crate::config::paths::DompetPaths;
    use crate::models::{Money, Month, NotificationKind};
    use crate::services::BudgetService;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Replays canned replies and records every request
    struct ScriptedModel {
        replies: RefCell<VecDeque<DompetResult<ModelReply>>>,
        requests: RefCell<Vec<ChatRequest>>,
        repeat_last: Option<ModelReply>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<DompetResult<ModelReply>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                requests: RefCell::new(Vec::new()),
                repeat_last: None,
            }
        }

        fn forever(reply: ModelReply) -> Self {
            Self {
                repeat_last: Some(reply),
                ..Self::new(Vec::new())
            }
        }
    }

    impl ChatModel for ScriptedModel {
        fn generate(&self, request: &ChatRequest) -> DompetResult<ModelReply> {
            self.requests.borrow_mut().push(request.clone());
            match self.replies.borrow_mut().pop_front() {
                Some(reply) => reply,
                None => self
                    .repeat_last
                    .clone()
                    .ok_or_else(|| DompetError::Ai("script exhausted".to_string())),
            }
        }
    }

    fn call(name: &str, args: serde_json::Value) -> FunctionCall {
        FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    fn setup() -> (Storage, Settings, TempDir) {
        let temp = TempDir::new().unwrap();
        let mut storage =
            Storage::new(DompetPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();
        (storage, Settings::default(), temp)
    }

    #[test]
    fn test_plain_answer_is_persisted() {
        let (storage, settings, _temp) = setup();
        let model = ScriptedModel::new(vec![Ok(ModelReply::text("Halo! Ada yang bisa dibantu?"))]);
        let session = ChatSession::new(&model, &storage, &settings, today());

        let reply = session.send("halo").unwrap();
        assert_eq!(reply.text, "Halo! Ada yang bisa dibantu?");
        assert!(reply.actions.is_empty());
        assert!(!reply.changed_data());

        let history = session.history().unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].is_user());

        let requests = model.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system.contains("2025-01-15"));
        assert_eq!(requests[0].tools.len(), 12);
    }

    #[test]
    fn test_tool_call_round_trip() {
        let (storage, settings, _temp) = setup();
        let model = ScriptedModel::new(vec![
            Ok(ModelReply::calls(vec![call(
                "add_transaction",
                json!({"type": "expense", "amount": 25000, "category": "Transportasi", "description": "Ojek"}),
            )])),
            Ok(ModelReply::text("Tercatat: Rp25.000 untuk Transportasi.")),
        ]);
        let session = ChatSession::new(&model, &storage, &settings, today());

        let reply = session.send("catat ojek 25rb").unwrap();
        assert_eq!(reply.actions.len(), 1);
        assert!(reply.changed_data());
        assert_eq!(storage.transactions.count().unwrap(), 1);

        let requests = model.requests.borrow();
        let second = &requests[1].messages;
        assert!(matches!(second.last(), Some(ChatMessage::ToolResults { results }) if results[0].name == "add_transaction"));

        // user, model calls, tool results, model text
        assert_eq!(session.history().unwrap().len(), 4);
    }

    #[test]
    fn test_iteration_budget() {
        let (storage, mut settings, _temp) = setup();
        settings.ai.max_tool_iterations = 2;
        let model = ScriptedModel::forever(ModelReply::calls(vec![call("get_goals", json!({}))]));
        let session = ChatSession::new(&model, &storage, &settings, today());

        let reply = session.send("cek target").unwrap();
        assert_eq!(reply.text, GIVE_UP_TEXT);
        assert_eq!(reply.actions.len(), 2);
        assert_eq!(model.requests.borrow().len(), 2);
    }

    #[test]
    fn test_iteration_budget_returns_last_text() {
        let (storage, mut settings, _temp) = setup();
        settings.ai.max_tool_iterations = 2;
        let model = ScriptedModel::forever(ModelReply {
            text: Some("Sedang mengecek target...".to_string()),
            calls: vec![call("get_goals", json!({}))],
        });
        let session = ChatSession::new(&model, &storage, &settings, today());

        let reply = session.send("cek target").unwrap();
        assert_eq!(reply.text, "Sedang mengecek target...");
        assert_eq!(reply.actions.len(), 2);
        assert_eq!(
            session.history().unwrap().last(),
            Some(&ChatMessage::model_text("Sedang mengecek target..."))
        );
    }

    #[test]
    fn test_mutation_triggers_notifications() {
        let (storage, settings, _temp) = setup();
        BudgetService::new(&storage, settings.notifications.budget_warning_percent)
            .set("Hiburan", Month::new(2025, 1).unwrap(), Money::from_rupiah(100_000))
            .unwrap();

        let model = ScriptedModel::new(vec![
            Ok(ModelReply::calls(vec![call(
                "add_transaction",
                json!({"type": "expense", "amount": 90000, "category": "Hiburan"}),
            )])),
            Ok(ModelReply::text("Sudah dicatat.")),
        ]);
        let session = ChatSession::new(&model, &storage, &settings, today());

        let reply = session.send("nonton 90rb").unwrap();
        assert_eq!(reply.notifications.len(), 1);
        assert_eq!(reply.notifications[0].kind, NotificationKind::BudgetWarning);
    }

    #[test]
    fn test_model_error_after_action_keeps_note() {
        let (storage, settings, _temp) = setup();
        let model = ScriptedModel::new(vec![
            Ok(ModelReply::calls(vec![call(
                "add_goal",
                json!({"name": "Laptop", "target_amount": 8000000, "target_date": "2025-01-25"}),
            )])),
            Err(DompetError::Http("503 Service Unavailable: overloaded".to_string())),
        ]);
        let session = ChatSession::new(&model, &storage, &settings, today());

        assert!(session.send("buat target laptop 8jt").is_err());
        assert_eq!(storage.goals.get_all().unwrap().len(), 1);
        // The new goal is due within the deadline window
        let raised = NotificationService::new(&storage, &settings.notifications)
            .list(false)
            .unwrap();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].kind, NotificationKind::GoalDeadline);

        let history = session.history().unwrap();
        match history.last() {
            Some(ChatMessage::Model { text: Some(text), .. }) => assert!(text.contains("1 aksi")),
            other => panic!("unexpected last message: {:?}", other),
        }
    }

    #[test]
    fn test_reset_and_empty_message() {
        let (storage, settings, _temp) = setup();
        let model = ScriptedModel::new(vec![Ok(ModelReply::text("Oke"))]);
        let session = ChatSession::new(&model, &storage, &settings, today());

        assert!(session.send("   ").is_err());
        session.send("tes").unwrap();
        session.reset().unwrap();
        assert!(session.history().unwrap().is_empty());
    }
}
