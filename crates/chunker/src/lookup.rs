use crate::error::Result;
use crate::record::{shard_key, Record};
use crate::store::ShardStore;

/// Cleans a typed-in account number: drops whitespace and a trailing `.0`
/// left over from spreadsheet copy-paste.
pub fn clean_account(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_suffix(".0") {
        Some(s) => s.to_string(),
        None => compact,
    }
}

/// Finds one account in the shard its prefix maps to.
pub fn lookup<S: ShardStore>(store: &S, raw: &str, prefix_len: usize) -> Result<Option<Record>> {
    let id: String = clean_account(raw).chars().filter(|c| c.is_ascii_digit()).collect();
    if id.is_empty() {
        return Ok(None);
    }

    let key = shard_key(&id, prefix_len);
    Ok(store.load(key)?.and_then(|mut shard| shard.remove(&id)))
}
