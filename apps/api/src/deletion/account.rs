//! Two-phase account deletion, ordered and fail-closed.
//!
//! Phase 1 removes every row the owner holds, in one transaction. Phase 2
//! asks the identity provider to remove the identity, and runs only after
//! Phase 1 fully succeeded. A Phase 1 failure leaves the account intact and
//! retryable; a Phase 2 failure after a successful Phase 1 is surfaced as the
//! distinct `PartialFailure` outcome, never as plain success or failure.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::identity::{IdentityProvider, OwnerId};
use crate::store;

use super::confirmation::{ConfirmationSession, TransitionError};

/// Token the caller must type to arm account deletion.
pub const CONFIRMATION_TOKEN: &str = "DELETE";
/// Prompting steps before arming: acknowledge, then type the token.
pub const CONFIRMATION_STEPS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct PurgeCounts {
    pub analyses_removed: u64,
    pub documents_removed: u64,
}

#[derive(Debug, Serialize)]
pub struct AccountDeletionReport {
    pub analyses_removed: u64,
    pub documents_removed: u64,
    pub identity_removed: bool,
}

/// Phase 1 seam: bulk removal of everything the owner holds. All-or-nothing;
/// a partial purge must report failure, not a partial count.
#[async_trait]
pub trait OwnerDataPurge: Send + Sync {
    async fn purge(&self, owner: OwnerId) -> Result<PurgeCounts, AppError>;
}

/// Transactional purge: analyses first, then documents, committed together.
pub struct SqlOwnerDataPurge {
    pool: PgPool,
}

impl SqlOwnerDataPurge {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OwnerDataPurge for SqlOwnerDataPurge {
    async fn purge(&self, owner: OwnerId) -> Result<PurgeCounts, AppError> {
        let mut tx = self.pool.begin().await?;
        let analyses_removed = store::analyses::delete_all_for_owner(&mut tx, owner).await?;
        let documents_removed = store::documents::delete_all_for_owner(&mut tx, owner).await?;
        tx.commit().await?;
        Ok(PurgeCounts {
            analyses_removed,
            documents_removed,
        })
    }
}

/// Runs the confirmation workflow and, once armed, the two deletion phases.
pub async fn delete_account(
    purge: &dyn OwnerDataPurge,
    identity: &dyn IdentityProvider,
    owner: OwnerId,
    typed_confirmation: &str,
) -> Result<AccountDeletionReport, AppError> {
    let mut session = ConfirmationSession::new(CONFIRMATION_STEPS, Some(CONFIRMATION_TOKEN));
    session.begin().map_err(workflow_error)?;
    // Issuing the request acknowledges the intermediate prompts; the typed
    // token is what arms the final step.
    for _ in 0..CONFIRMATION_STEPS - 1 {
        session.confirm().map_err(workflow_error)?;
    }
    session.record_input(typed_confirmation);
    if session.confirm().is_err() {
        return Err(AppError::Validation(format!(
            "account deletion requires typing \"{CONFIRMATION_TOKEN}\" to confirm"
        )));
    }
    session.execute().map_err(workflow_error)?;

    // Phase 1: remove owner data. On failure the identity is never touched.
    let counts = match purge.purge(owner).await {
        Ok(counts) => counts,
        Err(e) => {
            let _ = session.fail();
            warn!(owner = %owner, error = %e, "account deletion phase 1 failed; identity untouched");
            return Err(e);
        }
    };

    // Phase 2: remove the identity.
    if let Err(e) = identity.delete_identity(owner).await {
        let _ = session.fail();
        warn!(owner = %owner, error = %e, "account deletion phase 2 failed after data removal");
        return Err(AppError::PartialFailure(format!(
            "account data was removed ({} analyses, {} documents) but identity removal failed; \
             contact support to finish removing the account",
            counts.analyses_removed, counts.documents_removed
        )));
    }

    session.complete().map_err(workflow_error)?;
    info!(
        owner = %owner,
        analyses = counts.analyses_removed,
        documents = counts.documents_removed,
        "account deleted"
    );
    Ok(AccountDeletionReport {
        analyses_removed: counts.analyses_removed,
        documents_removed: counts.documents_removed,
        identity_removed: true,
    })
}

fn workflow_error(e: TransitionError) -> AppError {
    AppError::Internal(anyhow::anyhow!("confirmation workflow error: {e}"))
}
