pub mod inspect;
pub mod run;

use reshuffler::config::InputParams;
use reshuffler::error::{ReshufflerError, RsResult};
use reshuffler::loader;
use reshuffler::scorer::Allocation;
use std::path::PathBuf;

/// Where the initial allocations come from.
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Validated `Owner,TokenId,CategoryId` table.
    Validated(PathBuf),
    /// Airdrop table plus transfer log, validated on load.
    Raw { airdrops: PathBuf, transfers: PathBuf },
}

impl InputSource {
    pub fn from_flags(
        input: Option<PathBuf>,
        airdrops: Option<PathBuf>,
        transfers: Option<PathBuf>,
    ) -> RsResult<Self> {
        match (input, airdrops, transfers) {
            (Some(path), None, None) => Ok(Self::Validated(path)),
            (None, Some(airdrops), Some(transfers)) => Ok(Self::Raw {
                airdrops,
                transfers,
            }),
            _ => Err(ReshufflerError::Config(
                "provide either --input, or both --airdrops and --transfers".to_string(),
            )),
        }
    }

    pub fn load(&self, params: &InputParams) -> RsResult<Vec<Allocation>> {
        match self {
            Self::Validated(path) => loader::load_allocations_from_path(path, params),
            Self::Raw {
                airdrops,
                transfers,
            } => {
                let loaded = loader::load_submissions_from_paths(airdrops, transfers, params)?;
                if !loaded.rejected.is_empty() {
                    tracing::warn!("⚠️  Rejected {} transfers.", loaded.rejected.len());
                }
                Ok(loaded.allocations)
            }
        }
    }
}
