use regex::Regex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static LABEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").unwrap());

static DNS_SUBDOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

const MAX_NAME_LEN: usize = 63;
const MAX_PREFIX_LEN: usize = 253;

/// Parse a label selector string of `key=value` pairs into a BTreeMap.
///
/// `key==value` is accepted as well. Blank entries are skipped so that an empty
/// string yields an empty map. Keys may appear only once.
pub fn parse_labels(sel_str: &str) -> Result<BTreeMap<String, String>, String> {
    let mut map = BTreeMap::new();
    for pair in sel_str.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("'{}' is not a key=value pair", pair));
        };
        let key = key.trim();
        let value = value.strip_prefix('=').unwrap_or(value).trim();
        validate_key(key).map_err(|reason| format!("'{}': {}", pair, reason))?;
        validate_value(value).map_err(|reason| format!("'{}': {}", pair, reason))?;
        if map.insert(key.to_string(), value.to_string()).is_some() {
            return Err(format!("key '{}' is given more than once", key));
        }
    }
    Ok(map)
}

/// Label key: optional DNS subdomain prefix and `/`, then a name segment.
fn validate_key(key: &str) -> Result<(), String> {
    let name = match key.split_once('/') {
        Some((prefix, name)) => {
            if prefix.is_empty()
                || prefix.len() > MAX_PREFIX_LEN
                || !DNS_SUBDOMAIN.is_match(prefix)
            {
                return Err(format!("invalid key prefix '{}'", prefix));
            }
            name
        }
        None => key,
    };
    if name.is_empty() || name.len() > MAX_NAME_LEN || !LABEL_NAME.is_match(name) {
        return Err(format!("invalid key '{}'", key));
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    if value.len() > MAX_NAME_LEN || !LABEL_NAME.is_match(value) {
        return Err(format!("invalid value '{}'", value));
    }
    Ok(())
}

/// Home directory from `HOME`, falling back to `USERPROFILE`.
pub fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|var| std::env::var_os(var))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn default_kubeconfig_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".kube").join("config"))
}
