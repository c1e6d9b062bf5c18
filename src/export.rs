use crate::core_types::{CategoryId, TokenId};
use crate::error::RsResult;
use crate::optimizer::SearchState;
use crate::scorer::{Allocation, TokenCollection};
use crate::verifier::StateStats;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct ReallocationRow<'a> {
    #[serde(rename = "Owner")]
    owner: &'a str,
    #[serde(rename = "TokenId")]
    token_id: TokenId,
    #[serde(rename = "CategoryId")]
    category_id: CategoryId,
}

#[derive(Debug, Serialize)]
struct OverviewRow<'a> {
    #[serde(rename = "Owner")]
    owner: &'a str,
    #[serde(rename = "Initial")]
    initial: String,
    #[serde(rename = "Final")]
    current: String,
    #[serde(rename = "Variability")]
    variability: String,
    #[serde(rename = "ReturnedTokens")]
    returned_tokens: u64,
    #[serde(rename = "ReturnedCategories")]
    returned_categories: u64,
    #[serde(rename = "DuplicateCategoryTokens")]
    duplicate_category_tokens: u64,
    #[serde(rename = "Grails")]
    grails: usize,
    #[serde(rename = "Pool")]
    pool: bool,
}

/// One row per token: owner order first, then token order within the owner.
pub fn write_reallocations<A, W>(allocations: &[A], writer: W) -> RsResult<()>
where
    A: AsRef<Allocation>,
    W: Write,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for allocation in allocations {
        let allocation = allocation.as_ref();
        for token in allocation.tokens() {
            wtr.serialize(ReallocationRow {
                owner: allocation.owner(),
                token_id: token.id,
                category_id: token.category,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// One row per owner comparing the final allocation with the initial one.
/// `Grails` counts final tokens in any of `grail_categories`.
pub fn write_overview<W: Write>(
    state: &SearchState,
    grail_categories: &[CategoryId],
    writer: W,
) -> RsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (current, initial) in state.current().iter().zip(state.initial()) {
        let stats = StateStats::for_allocation(current, initial);
        wtr.serialize(OverviewRow {
            owner: current.owner(),
            initial: initial.histogram().to_string(),
            current: current.histogram().to_string(),
            variability: format!("{:.3}", current.variability(current.width())),
            returned_tokens: stats.num_returned_tokens,
            returned_categories: stats.num_returned_categories,
            duplicate_category_tokens: stats.num_duplicate_category_tokens,
            grails: current.num_in_categories(grail_categories),
            pool: current.is_pool(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Both output tables, rendered in memory.
pub struct RenderedOutputs {
    pub reallocations: Vec<u8>,
    pub overview: Vec<u8>,
}

impl RenderedOutputs {
    pub fn render(state: &SearchState, grail_categories: &[CategoryId]) -> RsResult<Self> {
        let mut reallocations = Vec::new();
        write_reallocations(state.current(), &mut reallocations)?;
        let mut overview = Vec::new();
        write_overview(state, grail_categories, &mut overview)?;
        Ok(Self {
            reallocations,
            overview,
        })
    }

    /// Writes `reallocations_<tag>.csv` and `overview_<tag>.csv` into `dir`.
    ///
    /// Both files are staged under temporary names first. On any failure the
    /// staged files are removed and neither final file is left behind.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P, tag: &str) -> RsResult<OutputPaths> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let paths = OutputPaths::new(dir, tag);
        let staged = paths.staged();

        let result = stage_and_publish(&paths, &staged, self);
        if let Err(e) = &result {
            warn!("Discarding outputs in {}: {}", dir.display(), e);
            for path in [&staged.reallocations, &staged.overview] {
                let _ = fs::remove_file(path);
            }
        }
        result?;

        info!("💾 Wrote {}", paths.reallocations.display());
        info!("💾 Wrote {}", paths.overview.display());
        Ok(paths)
    }
}

fn stage_and_publish(
    paths: &OutputPaths,
    staged: &OutputPaths,
    outputs: &RenderedOutputs,
) -> RsResult<()> {
    fs::write(&staged.reallocations, &outputs.reallocations)?;
    fs::write(&staged.overview, &outputs.overview)?;

    fs::rename(&staged.reallocations, &paths.reallocations)?;
    if let Err(e) = fs::rename(&staged.overview, &paths.overview) {
        let _ = fs::remove_file(&paths.reallocations);
        return Err(e.into());
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub reallocations: PathBuf,
    pub overview: PathBuf,
}

impl OutputPaths {
    pub fn new(dir: &Path, tag: &str) -> Self {
        Self {
            reallocations: dir.join(format!("reallocations_{}.csv", tag)),
            overview: dir.join(format!("overview_{}.csv", tag)),
        }
    }

    fn staged(&self) -> Self {
        let tmp = |path: &Path| {
            let mut name = path.as_os_str().to_owned();
            name.push(".tmp");
            PathBuf::from(name)
        };
        Self {
            reallocations: tmp(&self.reallocations),
            overview: tmp(&self.overview),
        }
    }
}
