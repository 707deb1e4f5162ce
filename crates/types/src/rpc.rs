use serde_json::{Map, Value};

/// Resolves a logical field against its accepted historical spellings:
/// the first alias that is present and non-null wins.
pub(crate) fn field<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|value| !value.is_null())
}
