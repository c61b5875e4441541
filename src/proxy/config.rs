use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How accounts reach the quest API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    /// Download the public list, cache it to the proxy file, then use it.
    PublicList,
    /// Use the operator's own proxy file.
    PrivateList,
    #[default]
    Direct,
}

impl ProxyMode {
    /// Accepts the menu numbers (1/2/3) as well as the mode names.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "public" | "public_list" => Some(ProxyMode::PublicList),
            "2" | "private" | "private_list" => Some(ProxyMode::PrivateList),
            "3" | "direct" | "none" | "off" => Some(ProxyMode::Direct),
            _ => None,
        }
    }

    pub fn uses_proxies(&self) -> bool {
        !matches!(self, ProxyMode::Direct)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProxyMode::PublicList => "public proxy list",
            ProxyMode::PrivateList => "private proxy list",
            ProxyMode::Direct => "no proxy",
        }
    }
}

/// Where the pool reads its entries from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxySource {
    Remote { url: String, cache_file: PathBuf },
    File(PathBuf),
}

impl ProxySource {
    pub fn for_mode(mode: ProxyMode, public_list_url: &str, proxy_file: PathBuf) -> Option<Self> {
        match mode {
            ProxyMode::PublicList => Some(ProxySource::Remote {
                url: public_list_url.to_string(),
                cache_file: proxy_file,
            }),
            ProxyMode::PrivateList => Some(ProxySource::File(proxy_file)),
            ProxyMode::Direct => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_menu_numbers_and_names() {
        assert_eq!(ProxyMode::parse("1"), Some(ProxyMode::PublicList));
        assert_eq!(ProxyMode::parse(" Private "), Some(ProxyMode::PrivateList));
        assert_eq!(ProxyMode::parse("3"), Some(ProxyMode::Direct));
        assert_eq!(ProxyMode::parse("4"), None);
        assert!(!ProxyMode::Direct.uses_proxies());
    }

    #[test]
    fn direct_mode_has_no_source() {
        let file = PathBuf::from("proxy.txt");
        assert_eq!(ProxySource::for_mode(ProxyMode::Direct, "http://x", file.clone()), None);
        assert_eq!(
            ProxySource::for_mode(ProxyMode::PrivateList, "http://x", file.clone()),
            Some(ProxySource::File(file))
        );
    }
}
