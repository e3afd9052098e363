use std::sync::Arc;

use uuid::Uuid;

use crate::domain::Board;
use crate::error::DomainError;
use crate::geo::Observer;
use crate::geofence::{BoardFilter, BoardListing, GeofenceEvaluator, RankedBoard};
use crate::ports::BoardRepository;

/// Parameters of a board-listing request.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardQuery {
    pub observer: Observer,
    pub filter: BoardFilter,
}

/// Board lookups gated by the geofence.
#[derive(Clone)]
pub struct BoardService {
    boards: Arc<dyn BoardRepository>,
    geofence: GeofenceEvaluator,
}

impl BoardService {
    pub fn new(boards: Arc<dyn BoardRepository>, geofence: GeofenceEvaluator) -> Self {
        Self { boards, geofence }
    }

    /// Ranked, filtered and capped listing with per-category counts.
    pub async fn list(&self, query: BoardQuery) -> Result<BoardListing, DomainError> {
        let boards = self.boards.list_all().await?;
        let total = boards.len();

        let listing = self.geofence.rank(boards, query.observer, query.filter);
        tracing::debug!(
            total,
            returned = listing.boards.len(),
            filter = %query.filter,
            observer_known = query.observer.is_known(),
            "Ranked boards"
        );

        Ok(listing)
    }

    /// Single board annotated with the observer's proximity.
    pub async fn get(&self, id: Uuid, observer: Observer) -> Result<RankedBoard, DomainError> {
        let board = self.find(id).await?;
        let proximity = self.geofence.evaluate(&board, observer);
        Ok(RankedBoard { board, proximity })
    }

    pub async fn find(&self, id: Uuid) -> Result<Board, DomainError> {
        self.boards
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "board",
                id,
            })
    }

    /// Load a board the observer is allowed to read.
    pub async fn ensure_viewable(
        &self,
        id: Uuid,
        observer: Observer,
    ) -> Result<Board, DomainError> {
        let board = self.find(id).await?;
        if !self.geofence.is_viewable(&board, observer) {
            return Err(DomainError::OutsideViewRadius { board_id: id });
        }
        Ok(board)
    }

    /// Load a board the observer is allowed to post to.
    pub async fn ensure_accessible(
        &self,
        id: Uuid,
        observer: Observer,
    ) -> Result<Board, DomainError> {
        let board = self.find(id).await?;
        if !self.geofence.is_accessible(&board, observer) {
            return Err(DomainError::OutsideAccessRadius { board_id: id });
        }
        Ok(board)
    }

    /// Board name for display; lookup failures are logged and swallowed.
    pub(crate) async fn name_of(&self, id: Uuid) -> Option<String> {
        match self.boards.find_by_id(id).await {
            Ok(board) => board.map(|b| b.name),
            Err(e) => {
                tracing::warn!(board_id = %id, error = %e, "Board enrichment failed");
                None
            }
        }
    }
}
