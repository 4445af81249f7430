//! Repair for duplicate photo ids left behind by the old batch upload.

use log::warn;
use rand::Rng;
use std::collections::HashSet;

use crate::portfolio::PhotoCollection;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Rewrites every repeated photo id inside a collection.
///
/// The first photo carrying an id keeps it; later ones become `{id}-{suffix}`.
/// Returns how many ids were rewritten.
pub fn repair_duplicate_photo_ids(collections: &mut [PhotoCollection]) -> usize {
    let mut rng = rand::thread_rng();
    let mut repaired = 0;

    for collection in collections.iter_mut() {
        let mut taken: HashSet<String> = collection.photos.iter().map(|p| p.id.clone()).collect();
        if taken.len() == collection.photos.len() {
            continue;
        }

        let mut seen = HashSet::new();
        for photo in collection.photos.iter_mut() {
            if seen.insert(photo.id.clone()) {
                continue;
            }
            let new_id = loop {
                let candidate = format!("{}-{}", photo.id, random_suffix(&mut rng));
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            warn!(
                "Duplicate photo id '{}' in collection '{}' rewritten to '{}'",
                photo.id, collection.id, new_id
            );
            taken.insert(new_id.clone());
            seen.insert(new_id.clone());
            photo.id = new_id;
            repaired += 1;
        }
    }

    repaired
}
