//! Query string codec.

use indexmap::IndexMap;

/// Query parameters as an insertion-ordered name → value mapping.
///
/// Parsing percent-decodes names and values and decodes `+` as a space.
/// A name that repeats collapses into one entry whose values are joined
/// with `,`. Rendering percent-encodes both sides.
///
/// # Example
///
/// ```
/// use hermes_middleware::QueryParams;
///
/// let mut params = QueryParams::parse("page=1&tag=a&tag=b");
/// assert_eq!(params.get("tag"), Some("a,b"));
///
/// params.set("page", "2");
/// params.set("api version", "v2");
/// assert_eq!(params.to_string(), "page=2&tag=a%2Cb&api%20version=v2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: IndexMap<String, String>,
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

impl QueryParams {
    /// Parses a raw query string, without the leading `?`.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params: IndexMap<String, String> = IndexMap::new();

        for pair in query.trim_start_matches('?').split('&') {
            if pair.is_empty() {
                continue;
            }
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let name = decode(name);
            let value = decode(value);

            params
                .entry(name)
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self { params }
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Overwrites a parameter, or appends it if absent.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterates over parameters in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for QueryParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(
                f,
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}
