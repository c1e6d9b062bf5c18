use crate::consts::MAX_SEED_HEX_DIGITS;
use crate::error::{ReshufflerError, RsResult};
use tracing::info;

/// Folds a hex string of at most 256 bits into an `i64` seed.
///
/// The value is read as a big-endian unsigned integer, split into four 64-bit
/// words and XOR-ed together; the bits are then reinterpreted as signed.
pub fn fold_seed(seed_hex: &str) -> RsResult<i64> {
    let digits = seed_hex
        .strip_prefix("0x")
        .or_else(|| seed_hex.strip_prefix("0X"))
        .unwrap_or(seed_hex);

    if digits.len() > MAX_SEED_HEX_DIGITS {
        return Err(ReshufflerError::InvalidSeed(format!(
            "hex seed {:?} longer than 256 bits",
            seed_hex
        )));
    }

    let padded = format!(
        "{:0>width$}",
        digits.trim_start_matches('0'),
        width = MAX_SEED_HEX_DIGITS
    );
    let bytes = hex::decode(&padded).map_err(|e| {
        ReshufflerError::InvalidSeed(format!("hex seed {:?} is not valid hex: {}", seed_hex, e))
    })?;

    let folded = bytes.chunks_exact(8).fold(0u64, |acc, chunk| {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        acc ^ u64::from_be_bytes(word)
    });

    let seed = folded as i64;
    info!("Seed {:?} folded into {:#x}", seed_hex, folded);
    Ok(seed)
}
