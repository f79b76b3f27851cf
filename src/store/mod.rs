use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::info;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::flow::{ContactOptions, FormController};
use crate::services::{OtpGateway, SubmissionGateway};

/// Untouched sessions older than this are swept on the next open().
const SESSION_MAX_AGE_MINUTES: i64 = 60;

/// In-memory registry of live form sessions. Nothing survives a restart;
/// a reloaded page simply opens a fresh session.
pub struct SessionRegistry {
    otp: Arc<dyn OtpGateway>,
    submission: Arc<dyn SubmissionGateway>,
    options: ContactOptions,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

struct Entry {
    controller: FormController,
    created_at: DateTime<Utc>,
}

impl SessionRegistry {
    pub fn new(
        otp: Arc<dyn OtpGateway>,
        submission: Arc<dyn SubmissionGateway>,
        options: ContactOptions,
    ) -> Self {
        SessionRegistry {
            otp,
            submission,
            options,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a fresh form session and hand back its id.
    pub async fn open(&self) -> Uuid {
        let mut sessions = self.sessions.lock().await;

        let horizon = Utc::now() - Duration::minutes(SESSION_MAX_AGE_MINUTES);
        sessions.retain(|_, entry| entry.created_at > horizon);

        let id = Uuid::new_v4();
        let controller = FormController::new(
            self.otp.clone(),
            self.submission.clone(),
            self.options.clone(),
        );
        sessions.insert(
            id,
            Entry {
                controller,
                created_at: Utc::now(),
            },
        );
        info!("Opened contact form session {} ({} live)", id, sessions.len());
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<FormController> {
        self.sessions
            .lock()
            .await
            .get(id)
            .map(|entry| entry.controller.clone())
    }
}
