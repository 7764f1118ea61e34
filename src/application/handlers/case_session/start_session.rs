//! StartSessionHandler - Opens a new attempt at a case.

use chrono::NaiveDate;
use std::sync::Arc;

use crate::domain::case::{Case, CaseCatalog, CaseSelector};
use crate::domain::foundation::CaseId;
use crate::domain::session::{CaseSession, SessionError};

/// Which case to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartSessionCommand {
    /// The featured case for a calendar date.
    TodayChallenge { date: NaiveDate },
    /// A case picked by the learner, or a reattempt of an earlier one.
    Case { case_id: CaseId },
}

/// Result of starting a session.
#[derive(Debug, Clone)]
pub struct StartSessionResult {
    pub session: CaseSession,
    pub case: Case,
}

/// Handler for starting sessions.
///
/// Every call yields a fresh session; reattempts never reuse a scored one.
pub struct StartSessionHandler {
    catalog: Arc<CaseCatalog>,
}

impl StartSessionHandler {
    pub fn new(catalog: Arc<CaseCatalog>) -> Self {
        Self { catalog }
    }

    pub fn handle(&self, cmd: StartSessionCommand) -> Result<StartSessionResult, SessionError> {
        let case = match &cmd {
            StartSessionCommand::TodayChallenge { date } => {
                CaseSelector::today_challenge(&self.catalog, *date)
            }
            StartSessionCommand::Case { case_id } => CaseSelector::reattempt(case_id, &self.catalog)?,
        };

        let session = CaseSession::start(case.id().clone());

        tracing::info!(
            session_id = %session.id(),
            case_id = %case.id(),
            "Started case session"
        );

        Ok(StartSessionResult {
            session,
            case: case.clone(),
        })
    }
}
