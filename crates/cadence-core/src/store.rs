//! In-process calendar store keyed by session id.
//!
//! Entries live for the lifetime of the process; there is no eviction.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::CalendarError;
use crate::models::Calendar;

/// Shared, cloneable handle to the stored calendars.
#[derive(Debug, Clone, Default)]
pub struct CalendarStore {
    inner: Arc<RwLock<HashMap<String, Arc<Calendar>>>>,
}

impl CalendarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `calendar` under its session id, replacing any previous entry.
    pub async fn insert(&self, calendar: Calendar) -> Arc<Calendar> {
        let calendar = Arc::new(calendar);
        self.inner
            .write()
            .await
            .insert(calendar.session_id.clone(), Arc::clone(&calendar));
        calendar
    }

    pub async fn get(&self, session_id: &str) -> Result<Arc<Calendar>, CalendarError> {
        self.inner
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| CalendarError::NotFound(session_id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
