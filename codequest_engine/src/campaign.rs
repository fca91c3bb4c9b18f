//! Campaign progression through the catalog's levels in number order.

use codequest_data::{Catalog, LevelKind};
use log::info;

use crate::error::SessionError;
use crate::session::LevelSession;
use crate::settings::EngineSettings;

/// Where `advance` left the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Level(LevelKind),
    Finished,
}

#[derive(Debug)]
pub struct Campaign {
    catalog: Catalog,
    settings: EngineSettings,
    order: Vec<LevelKind>,
    current: usize,
    session: LevelSession,
    finished: bool,
}

impl Campaign {
    /// Start at the lowest-numbered level.
    ///
    /// # Errors
    /// [`SessionError::EmptyCatalog`] if the catalog defines no levels.
    pub fn new(catalog: Catalog, settings: EngineSettings) -> Result<Self, SessionError> {
        let order: Vec<LevelKind> = catalog.ordered().iter().map(|level| level.kind).collect();
        let first = *order.first().ok_or(SessionError::EmptyCatalog)?;
        let session = LevelSession::from_catalog(&catalog, first, settings.clone())?;
        Ok(Self {
            catalog,
            settings,
            order,
            current: 0,
            session,
            finished: false,
        })
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LevelSession {
        &mut self.session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn current_level(&self) -> LevelKind {
        self.session.kind()
    }

    /// Level kinds in play order.
    pub fn levels(&self) -> &[LevelKind] {
        &self.order
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Jump straight to `kind`, abandoning the current attempt.
    ///
    /// # Errors
    /// [`SessionError::UnknownLevel`] if the catalog lacks the level.
    pub fn select(&mut self, kind: LevelKind) -> Result<(), SessionError> {
        let idx = self
            .order
            .iter()
            .position(|candidate| *candidate == kind)
            .ok_or_else(|| SessionError::UnknownLevel(kind.slug().to_string()))?;
        self.enter(idx)
    }

    /// Move on once the current level is completed.
    ///
    /// # Errors
    /// [`SessionError::LevelNotCompleted`] while the current level is unfinished.
    pub fn advance(&mut self) -> Result<Progress, SessionError> {
        if !self.session.is_completed() {
            return Err(SessionError::LevelNotCompleted(self.session.grammar().title()));
        }
        let next = self.current + 1;
        if next >= self.order.len() {
            info!("campaign finished");
            self.finished = true;
            return Ok(Progress::Finished);
        }
        self.enter(next)?;
        Ok(Progress::Level(self.current_level()))
    }

    /// Back to the first level with a fresh session.
    ///
    /// # Errors
    /// Propagates session construction errors.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.enter(0)
    }

    fn enter(&mut self, idx: usize) -> Result<(), SessionError> {
        let kind = *self.order.get(idx).ok_or(SessionError::EmptyCatalog)?;
        self.session.cancel();
        self.session = LevelSession::from_catalog(&self.catalog, kind, self.settings.clone())?;
        self.current = idx;
        self.finished = false;
        Ok(())
    }
}
