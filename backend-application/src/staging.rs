//! Staged diffs held in the session store until the user confirms them.
//!
//! Each user session holds any number of staged diffs, one per token. Entries live
//! only as long as the session store keeps them; callers clear a diff explicitly
//! after a successful apply.

use anyhow::Context;
use backend_domain::ports::SessionStore;
use backend_domain::{StagedDiff, StagingToken, UserId};
use tracing::warn;

pub const IMPORT_TOKEN_PREFIX: &str = "import_";
pub const TRANSFER_TOKEN_PREFIX: &str = "transfer_";

const TOKEN_BYTES: usize = 16;
const STAGED_KEY_PREFIX: &str = "staged:";

pub struct StagedTransactionStore<'a> {
    sessions: &'a dyn SessionStore,
}

impl<'a> StagedTransactionStore<'a> {
    pub fn new(sessions: &'a dyn SessionStore) -> Self {
        Self { sessions }
    }

    /// Stores the diff under a fresh token in its owner's session.
    pub async fn store(&self, diff: &StagedDiff) -> anyhow::Result<StagingToken> {
        let prefix = match diff {
            StagedDiff::Import(_) => IMPORT_TOKEN_PREFIX,
            StagedDiff::Transfer(_) => TRANSFER_TOKEN_PREFIX,
        };
        let token = generate_token(prefix);
        let payload = serde_json::to_string(diff).context("serialize staged diff")?;
        self.sessions
            .set(diff.user_id().as_str(), &staged_key(&token), payload)
            .await?;
        Ok(token)
    }

    /// `None` when the token is unknown, expired, or its payload no longer decodes.
    pub async fn retrieve(
        &self,
        user: &UserId,
        token: &StagingToken,
    ) -> anyhow::Result<Option<StagedDiff>> {
        let Some(payload) = self.sessions.get(user.as_str(), &staged_key(token)).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<StagedDiff>(&payload) {
            Ok(diff) if diff.user_id() == user => Ok(Some(diff)),
            Ok(_) => {
                warn!(user = %user, token = %token, "staged diff owned by another user");
                Ok(None)
            }
            Err(err) => {
                warn!(user = %user, token = %token, "discarding undecodable staged diff: {}", err);
                Ok(None)
            }
        }
    }

    pub async fn clear(&self, user: &UserId, token: &StagingToken) -> anyhow::Result<()> {
        self.sessions.remove(user.as_str(), &staged_key(token)).await
    }
}

pub fn generate_token(prefix: &str) -> StagingToken {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    StagingToken(format!("{}{}", prefix, hex::encode(bytes)))
}

fn staged_key(token: &StagingToken) -> String {
    format!("{}{}", STAGED_KEY_PREFIX, token.as_str())
}
