use crate::config::InputParams;
use crate::core_types::{CategoryId, OwnerId, Token, TokenId};
use crate::error::{ReshufflerError, RsResult};
use crate::scorer::{Allocation, AllocationSet};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct AllocationRecord {
    #[serde(rename = "Owner")]
    owner: OwnerId,
    #[serde(rename = "TokenId")]
    token_id: TokenId,
    #[serde(rename = "CategoryId")]
    category_id: CategoryId,
}

#[derive(Debug, Clone, Deserialize)]
struct AirdropRecord {
    #[serde(rename = "TokenId")]
    token_id: TokenId,
    #[serde(rename = "Airdrop receiver")]
    receiver: OwnerId,
    #[serde(rename = "ProjectId")]
    project_id: CategoryId,
}

#[derive(Debug, Deserialize)]
struct TransferRecord {
    #[serde(rename = "From")]
    from: OwnerId,
    #[serde(rename = "TokenId")]
    token_id: TokenId,
}

/// A transfer that was not accepted as a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedTransfer {
    pub token_id: TokenId,
    pub from: OwnerId,
    /// Original receiver of the token, `None` if it was never airdropped.
    pub receiver: Option<OwnerId>,
}

pub struct LoadedSubmissions {
    pub allocations: Vec<Allocation>,
    pub rejected: Vec<RejectedTransfer>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn normalise_address(address: &str) -> OwnerId {
    address.trim().to_ascii_lowercase()
}

/// Reads a validated allocation table with header `Owner,TokenId,CategoryId`,
/// one row per token.
pub fn load_allocations<R: Read>(reader: R, params: &InputParams) -> RsResult<Vec<Allocation>> {
    let mut rdr = csv_reader(reader);
    let mut by_owner: BTreeMap<OwnerId, Vec<Token>> = BTreeMap::new();

    for result in rdr.deserialize() {
        let rec: AllocationRecord = result?;
        by_owner
            .entry(rec.owner)
            .or_default()
            .push(Token::new(rec.token_id, rec.category_id));
    }

    build_allocations(by_owner, params)
}

pub fn load_allocations_from_path<P: AsRef<Path>>(
    path: P,
    params: &InputParams,
) -> RsResult<Vec<Allocation>> {
    let path = path.as_ref();
    info!("📂 Loading allocations: {}", path.display());
    load_allocations(File::open(path)?, params)
}

/// Reads raw submissions: the airdrop table (`TokenId,Airdrop receiver,ProjectId`)
/// and the transfer log (`From,TokenId`).
///
/// A transfer counts as a submission only if its sender is the token's
/// original receiver. Addresses compare case-insensitively and owners come
/// out lowercased.
pub fn load_submissions<A: Read, T: Read>(
    airdrops: A,
    transfers: T,
    params: &InputParams,
) -> RsResult<LoadedSubmissions> {
    let mut airdropped: HashMap<TokenId, AirdropRecord> = HashMap::new();
    for result in csv_reader(airdrops).deserialize() {
        let rec: AirdropRecord = result?;
        airdropped.insert(rec.token_id, rec);
    }
    debug!("{} airdropped tokens", airdropped.len());

    let mut by_owner: BTreeMap<OwnerId, Vec<Token>> = BTreeMap::new();
    let mut rejected = Vec::new();

    for result in csv_reader(transfers).deserialize() {
        let rec: TransferRecord = result?;
        let from = normalise_address(&rec.from);

        match airdropped.get(&rec.token_id) {
            Some(air) if normalise_address(&air.receiver) == from => {
                by_owner
                    .entry(from)
                    .or_default()
                    .push(Token::new(rec.token_id, air.project_id));
            }
            other => {
                let receiver = other.map(|air| normalise_address(&air.receiver));
                info!(
                    "Rejecting token {}: from={}, receiver={}",
                    rec.token_id,
                    from,
                    receiver.as_deref().unwrap_or("<none>")
                );
                rejected.push(RejectedTransfer {
                    token_id: rec.token_id,
                    from,
                    receiver,
                });
            }
        }
    }

    let allocations = build_allocations(by_owner, params)?;
    Ok(LoadedSubmissions {
        allocations,
        rejected,
    })
}

pub fn load_submissions_from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
    airdrops: P,
    transfers: Q,
    params: &InputParams,
) -> RsResult<LoadedSubmissions> {
    let (airdrops, transfers) = (airdrops.as_ref(), transfers.as_ref());
    info!(
        "📂 Loading submissions: airdrops={}, transfers={}",
        airdrops.display(),
        transfers.display()
    );
    load_submissions(File::open(airdrops)?, File::open(transfers)?, params)
}

/// Turns grouped tokens into allocations, in owner order, and runs the
/// input sanity checks.
pub fn build_allocations(
    by_owner: BTreeMap<OwnerId, Vec<Token>>,
    params: &InputParams,
) -> RsResult<Vec<Allocation>> {
    let mut allocations = Vec::with_capacity(by_owner.len());
    let mut pool_found = false;

    for (owner, tokens) in by_owner {
        let is_pool = params
            .pool_owner
            .as_deref()
            .is_some_and(|pool| pool.trim().eq_ignore_ascii_case(&owner));

        let allocation = Allocation::new(owner, tokens, params.num_categories)?;
        if is_pool {
            pool_found = true;
            allocations.push(allocation.into_pool());
        } else {
            allocations.push(allocation);
        }
    }

    if let Some(pool) = &params.pool_owner {
        if !pool_found {
            warn!("⚠️  Pool owner '{}' holds no tokens in the input.", pool);
        }
    }

    let dupes = allocations.duplicate_token_ids();
    if !dupes.is_empty() {
        return Err(ReshufflerError::DuplicateTokens(dupes));
    }

    let per_category = allocations.num_per_category(params.num_categories);
    let proportions: Vec<String> = per_category
        .normalised()
        .iter()
        .map(|p| format!("{:.2}", p))
        .collect();
    info!(
        "numOwners={}, numTokens={}",
        allocations.len(),
        allocations.num_tokens()
    );
    info!("Number per category: {}", per_category);
    info!("Proportion per category: [{}]", proportions.join(" "));

    Ok(allocations)
}
