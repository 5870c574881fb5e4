use gutcheck_types::Storable;
use indexmap::IndexMap;

/// Concatenates `local` then `remote`, keeping the first item seen for each
/// id. A device-local copy therefore wins over a remote one, and the
/// relative order within each input is preserved.
pub fn merge_by_id<T: Storable>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
    let mut merged: IndexMap<String, T> = IndexMap::with_capacity(local.len() + remote.len());
    for item in local.into_iter().chain(remote) {
        merged.entry(item.id().to_string()).or_insert(item);
    }
    merged.into_values().collect()
}
