use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

fn invalid_chars() -> &'static Regex {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();
    INVALID_CHARS.get_or_init(|| Regex::new(r"[^-._A-Za-z0-9~^]").unwrap())
}

fn replace_invalid_chars(s: &str) -> String {
    invalid_chars().replace_all(s, "_").into_owned()
}

/// 量測器識別：名稱加上一組依 key 排序的標籤
#[derive(Debug, Clone)]
pub struct MeterId {
    name: String,
    tags: BTreeMap<String, String>,
    spectatord_id: String,
}

impl MeterId {
    pub fn new(name: impl Into<String>, tags: &[(&str, &str)]) -> Self {
        Self::from_parts(name.into(), tags.iter().map(|(k, v)| (k.to_string(), v.to_string())))
    }

    fn from_parts<I>(name: String, tags: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        // 空的 key 或 value 直接丟棄
        let tags: BTreeMap<String, String> = tags
            .into_iter()
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        let spectatord_id = Self::to_spectatord_id(&name, &tags);
        Self {
            name,
            tags,
            spectatord_id,
        }
    }

    fn to_spectatord_id(name: &str, tags: &BTreeMap<String, String>) -> String {
        let mut id = replace_invalid_chars(name);
        for (key, value) in tags {
            id.push(',');
            id.push_str(&replace_invalid_chars(key));
            id.push('=');
            id.push_str(&replace_invalid_chars(value));
        }
        id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Wire form used in protocol lines, e.g. `server.requests,method=GET`.
    pub fn spectatord_id(&self) -> &str {
        &self.spectatord_id
    }

    pub fn with_tag(&self, key: &str, value: &str) -> MeterId {
        self.with_tags([(key, value)])
    }

    pub fn with_tags<'a, I>(&self, additional: I) -> MeterId
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tags = self.tags.clone();
        for (key, value) in additional {
            tags.insert(key.to_string(), value.to_string());
        }
        Self::from_parts(self.name.clone(), tags)
    }
}

impl PartialEq for MeterId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.tags == other.tags
    }
}

impl Eq for MeterId {}

impl Hash for MeterId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.tags.hash(state);
    }
}

impl fmt::Display for MeterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeterId(name={}, tags={{", self.name)?;
        for (i, (key, value)) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': '{}'", key, value)?;
        }
        f.write_str("})")
    }
}
