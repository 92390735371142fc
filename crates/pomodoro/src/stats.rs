//! Focus statistics over the completed-session history

use serde::Serialize;

use crate::history::CompletedSession;

/// Aggregated history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub total_sessions: u32,
    /// Work phases that ran to zero
    pub completed_sessions: u32,
    pub total_focus_seconds: u64,
    /// Percentage, 0-100
    pub completion_rate: u32,
    pub average_focus_seconds: u64,
}

impl SessionStats {
    pub fn from_sessions(sessions: &[CompletedSession]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let total_sessions = sessions.len() as u32;
        let completed_sessions = sessions.iter().filter(|s| s.completed).count() as u32;
        let total_focus_seconds: u64 = sessions.iter().map(|s| s.focused_seconds).sum();

        Self {
            total_sessions,
            completed_sessions,
            total_focus_seconds,
            completion_rate: (completed_sessions * 100) / total_sessions,
            average_focus_seconds: total_focus_seconds / u64::from(total_sessions),
        }
    }

    /// Total focus time as (hours, minutes)
    pub fn total_time(&self) -> (u64, u64) {
        let minutes = self.total_focus_seconds / 60;
        (minutes / 60, minutes % 60)
    }
}
