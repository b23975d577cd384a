use std::path::PathBuf;

pub const ASSET_PREFIX: &str = "http://asset.localhost/";

pub trait AssetResolver {
    fn locator(&self, path: &str) -> String;
}

impl<F> AssetResolver for F
where
    F: Fn(&str) -> String,
{
    fn locator(&self, path: &str) -> String {
        self(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetProtocol {
    prefix: String,
}

impl Default for AssetProtocol {
    fn default() -> Self {
        Self::new(ASSET_PREFIX)
    }
}

impl AssetProtocol {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn path_of(&self, locator: &str) -> Option<PathBuf> {
        let encoded = locator.strip_prefix(self.prefix.as_str())?;
        urlencoding::decode(encoded)
            .ok()
            .map(|decoded| PathBuf::from(decoded.into_owned()))
    }
}

impl AssetResolver for AssetProtocol {
    fn locator(&self, path: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(path))
    }
}

/// Strips `prefix` if present. The result is still percent-encoded; this
/// is a convention, not an inverse of [`AssetResolver::locator`].
pub fn strip_asset_prefix<'a>(locator: &'a str, prefix: &str) -> &'a str {
    locator.strip_prefix(prefix).unwrap_or(locator)
}
