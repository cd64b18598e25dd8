//! Normalized cache keys.

use std::borrow::Borrow;
use std::fmt;

/// A cache key derived from an operation name and its parameters.
///
/// Parameters are sorted by name before the key is rendered, so the same
/// logical request always maps to the same key regardless of the order the
/// caller supplied the parameters in. The separators `:`, `=` and `&` (and
/// `%` itself) are percent-encoded inside the operation name, parameter names
/// and values, so distinct requests never render to the same key.
///
/// ```
/// use pricewatch_cache::CacheKey;
///
/// let a = CacheKey::new("products", [("store", "42"), ("page", "1")]);
/// let b = CacheKey::new("products", [("page", "1"), ("store", "42")]);
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "products:page=1&store=42");
///
/// let c = CacheKey::new("search", [("q", "tv&store=7")]);
/// assert_eq!(c.as_str(), "search:q=tv%26store%3D7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new<I, K, V>(operation: &str, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut pairs: Vec<(String, String)> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_owned(), v.as_ref().to_owned()))
            .collect();
        pairs.sort();

        let mut key = String::with_capacity(operation.len() + 1 + pairs.len() * 16);
        push_escaped(&mut key, operation);
        key.push(':');
        for (i, (name, value)) in pairs.iter().enumerate() {
            if i > 0 {
                key.push('&');
            }
            push_escaped(&mut key, name);
            key.push('=');
            push_escaped(&mut key, value);
        }
        CacheKey(key)
    }

    /// Key for an operation without parameters.
    pub fn operation(operation: &str) -> Self {
        Self::new::<_, &str, &str>(operation, [])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn push_escaped(key: &mut String, part: &str) {
    for c in part.chars() {
        match c {
            '%' => key.push_str("%25"),
            '&' => key.push_str("%26"),
            ':' => key.push_str("%3A"),
            '=' => key.push_str("%3D"),
            c => key.push(c),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CacheKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}
