/// Review store and trust-chain resolution.
///
/// The store is one JSON document mapping hostname to the pinned walk. It is
/// always read and rewritten whole; writes go to a staging file that is
/// renamed over the original.
use crate::error::TrustError;
use crate::fingerprint::verify_fingerprint;
use crate::model::{Review, Reviews};
use crate::store::{self, WalkFile};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

pub fn read_reviews(path: &Path) -> Result<Reviews, TrustError> {
    let text = fs::read_to_string(path).map_err(|source| TrustError::ReviewRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| TrustError::ReviewParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the store at `path` with `reviews`.
pub fn write_reviews(path: &Path, reviews: &Reviews) -> Result<(), TrustError> {
    let mut text = serde_json::to_string_pretty(reviews).map_err(TrustError::ReviewEncode)?;
    text.push('\n');

    let write_err = |source| TrustError::ReviewWrite {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reviews".to_string());
    let staging = path.with_file_name(format!(".{file_name}.{}.staging", Uuid::new_v4()));
    {
        let mut file = fs::File::create(&staging).map_err(write_err)?;
        file.write_all(text.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
    }
    if let Err(e) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(write_err(e));
    }
    debug!("Wrote {} reviews to {}", reviews.reviews.len(), path.display());
    Ok(())
}

/// Load and verify the last known good walk for `hostname`.
///
/// Returns `Ok(None)` when the store has no entry for the host. The raw
/// bytes must match the pinned fingerprint before they are decoded, and the
/// decoded walk must carry the pinned id.
pub fn read_last_good_walk(
    hostname: &str,
    review_file: &Path,
) -> Result<Option<WalkFile>, TrustError> {
    let reviews = read_reviews(review_file)?;
    let Some(review) = reviews.reviews.get(hostname) else {
        debug!("No review entry for {hostname} in {}", review_file.display());
        return Ok(None);
    };
    // Any change to the pinned bytes must surface as a fingerprint mismatch,
    // so the blob is verified before it is decoded.
    let path = Path::new(&review.walk_reference);
    let (bytes, fingerprint) = store::read_walk_bytes(path)?;
    verify_fingerprint(&review.fingerprint, &fingerprint)?;
    let walk_file = WalkFile {
        path: path.to_path_buf(),
        walk: store::decode_walk(&bytes, path)?,
        fingerprint,
    };
    if walk_file.walk.id != review.walk_id {
        return Err(TrustError::IdMismatch {
            expected: review.walk_id.clone(),
            actual: walk_file.walk.id.clone(),
            reference: review.walk_reference.clone(),
            review_file: review_file.to_path_buf(),
        });
    }
    Ok(Some(walk_file))
}

/// The review entry that would pin `walk_file`.
pub fn review_for(walk_file: &WalkFile) -> Review {
    Review {
        walk_id: walk_file.walk.id.clone(),
        walk_reference: walk_file.path.to_string_lossy().into_owned(),
        fingerprint: walk_file.fingerprint.clone(),
    }
}

/// Pretty JSON of a store holding only `review` for `hostname`.
pub fn review_section(hostname: &str, review: &Review) -> Result<String, TrustError> {
    let section = Reviews {
        reviews: BTreeMap::from([(hostname.to_string(), review.clone())]),
    };
    serde_json::to_string_pretty(&section).map_err(TrustError::ReviewEncode)
}

/// Pin `walk_file` as the last known good walk for its host.
///
/// With a `review_file`, the store is read (a missing file counts as empty),
/// the host's entry is replaced, and the store is written back. Without one
/// nothing is written. Either way the new entry is returned.
pub fn update_review(walk_file: &WalkFile, review_file: Option<&Path>) -> Result<Review, TrustError> {
    let review = review_for(walk_file);
    let Some(path) = review_file else {
        return Ok(review);
    };
    let mut reviews = match read_reviews(path) {
        Ok(r) => r,
        Err(TrustError::ReviewRead { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            Reviews::default()
        }
        Err(e) => return Err(e),
    };
    reviews
        .reviews
        .insert(walk_file.walk.hostname.clone(), review.clone());
    write_reviews(path, &reviews)?;
    info!(
        "Pinned walk {} for {} in {}",
        review.walk_id,
        walk_file.walk.hostname,
        path.display()
    );
    Ok(review)
}
