//! Charsets and the charset registry.
//!
//! A [`Charset`] is a cheap `Copy` handle over an `encoding_rs` encoding.
//! Labels resolve through [`Charset::for_label`] (WHATWG labels) or through a
//! [`CharsetRegistry`], which layers caller-registered aliases on top.

use crate::error::{OxiCharsetError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A text encoding used to decode and encode entry names.
#[derive(Clone, Copy)]
pub struct Charset(&'static Encoding);

impl Charset {
    /// UTF-8, the only charset modern ZIP tools flag explicitly.
    pub const UTF_8: Self = Self(encoding_rs::UTF_8);
    /// Shift_JIS (Windows-31J flavour), common in Japanese archives.
    pub const SHIFT_JIS: Self = Self(encoding_rs::SHIFT_JIS);
    /// EUC-JP.
    pub const EUC_JP: Self = Self(encoding_rs::EUC_JP);
    /// ISO-2022-JP.
    pub const ISO_2022_JP: Self = Self(encoding_rs::ISO_2022_JP);
    /// EUC-KR (decodes the CP949 superset).
    pub const EUC_KR: Self = Self(encoding_rs::EUC_KR);
    /// GBK.
    pub const GBK: Self = Self(encoding_rs::GBK);
    /// GB18030.
    pub const GB18030: Self = Self(encoding_rs::GB18030);
    /// Big5.
    pub const BIG5: Self = Self(encoding_rs::BIG5);
    /// windows-1252, which WHATWG also uses for the ISO-8859-1 labels.
    pub const WINDOWS_1252: Self = Self(encoding_rs::WINDOWS_1252);

    /// Wrap an `encoding_rs` encoding.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }

    /// Resolve a WHATWG label such as `"Shift_JIS"`, `"euc-jp"` or `"utf8"`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn for_label(label: &str) -> Result<Self> {
        if label.trim().is_empty() {
            return Err(OxiCharsetError::missing_argument("charset"));
        }
        Encoding::for_label_no_replacement(label.as_bytes())
            .map(Self)
            .ok_or_else(|| OxiCharsetError::unsupported_charset(label))
    }

    /// Canonical name of the charset.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// The underlying `encoding_rs` encoding.
    pub fn encoding(&self) -> &'static Encoding {
        self.0
    }

    /// Encode `text`.
    ///
    /// Unmappable characters are replaced with HTML numeric character
    /// references rather than failing. UTF-16 and the replacement encoding
    /// cannot be encoded to and produce UTF-8; the returned charset names
    /// the encoding actually used.
    pub fn encode<'a>(&self, text: &'a str) -> (Cow<'a, [u8]>, Charset) {
        let (bytes, used, _) = self.0.encode(text);
        (bytes, Self(used))
    }

    /// Decode `bytes`, returning `None` on any malformed sequence.
    pub fn decode_strict<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        let (text, had_errors) = self.0.decode_without_bom_handling(bytes);
        if had_errors { None } else { Some(text) }
    }

    /// Decode `bytes`, substituting U+FFFD for malformed sequences.
    pub fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        self.0.decode_without_bom_handling(bytes).0
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Charset {}

impl Hash for Charset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl PartialOrd for Charset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Charset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name().cmp(other.name())
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&'static Encoding> for Charset {
    fn from(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }
}

/// Resolves charset labels, with optional aliases.
///
/// Aliases are consulted first, so they may also shadow a WHATWG label.
#[derive(Debug, Clone, Default)]
pub struct CharsetRegistry {
    aliases: HashMap<String, Charset>,
}

impl CharsetRegistry {
    /// Create a registry that knows only the WHATWG labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that also knows common code page names found in
    /// legacy tooling (`cp932`, `cp949`, `cp936`, ...).
    pub fn with_legacy_aliases() -> Self {
        Self::new()
            .with_alias("cp932", Charset::SHIFT_JIS)
            .with_alias("euc_jp", Charset::EUC_JP)
            .with_alias("iso2022jp", Charset::ISO_2022_JP)
            .with_alias("cp949", Charset::EUC_KR)
            .with_alias("ms949", Charset::EUC_KR)
            .with_alias("cp936", Charset::GBK)
            .with_alias("cp950", Charset::BIG5)
    }

    /// Add an alias (builder style).
    pub fn with_alias(mut self, alias: &str, charset: Charset) -> Self {
        self.register_alias(alias, charset);
        self
    }

    /// Add an alias.
    pub fn register_alias(&mut self, alias: &str, charset: Charset) {
        self.aliases.insert(normalize(alias), charset);
    }

    /// Number of registered aliases.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    /// Resolve a label to a charset.
    pub fn resolve(&self, label: &str) -> Result<Charset> {
        if let Some(charset) = self.aliases.get(&normalize(label)) {
            return Ok(*charset);
        }
        Charset::for_label(label)
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_label() {
        assert_eq!(Charset::for_label("Shift_JIS").unwrap(), Charset::SHIFT_JIS);
        assert_eq!(Charset::for_label("sjis").unwrap(), Charset::SHIFT_JIS);
        assert_eq!(Charset::for_label(" UTF-8 ").unwrap(), Charset::UTF_8);
        assert_eq!(Charset::for_label("euc-jp").unwrap(), Charset::EUC_JP);
        assert_eq!(Charset::for_label("ISO-8859-1").unwrap(), Charset::WINDOWS_1252);
    }

    #[test]
    fn test_for_label_errors() {
        assert!(matches!(
            Charset::for_label("x-klingon"),
            Err(OxiCharsetError::UnsupportedCharset { .. })
        ));
        assert!(matches!(
            Charset::for_label(""),
            Err(OxiCharsetError::MissingArgument { .. })
        ));
        // Labels that map to the replacement encoding are not usable.
        assert!(Charset::for_label("iso-2022-kr").is_err());
    }

    #[test]
    fn test_decode_strict() {
        let (sjis, _) = Charset::SHIFT_JIS.encode("日本語");
        assert_eq!(
            Charset::SHIFT_JIS.decode_strict(&sjis).as_deref(),
            Some("日本語")
        );
        assert_eq!(Charset::UTF_8.decode_strict(&sjis), None);
        assert!(Charset::UTF_8.decode_lossy(&sjis).contains('\u{FFFD}'));
    }

    #[test]
    fn test_encode_unmappable_uses_ncr() {
        let (bytes, used) = Charset::SHIFT_JIS.encode("café");
        assert_eq!(used, Charset::SHIFT_JIS);
        assert_eq!(&bytes[..], b"caf&#233;");
    }

    #[test]
    fn test_equality_and_ordering() {
        assert_eq!(Charset::new(encoding_rs::SHIFT_JIS), Charset::SHIFT_JIS);
        assert_ne!(Charset::SHIFT_JIS, Charset::EUC_JP);
        assert!(Charset::EUC_JP < Charset::SHIFT_JIS);
        assert_eq!(Charset::SHIFT_JIS.to_string(), "Shift_JIS");
    }

    #[test]
    fn test_registry_aliases() {
        let registry = CharsetRegistry::with_legacy_aliases();
        assert_eq!(registry.resolve("CP932").unwrap(), Charset::SHIFT_JIS);
        assert_eq!(registry.resolve("cp949").unwrap(), Charset::EUC_KR);
        assert_eq!(registry.resolve("utf-8").unwrap(), Charset::UTF_8);
        assert!(registry.resolve("cp437").is_err());

        let registry = CharsetRegistry::new().with_alias("legacy", Charset::EUC_JP);
        assert_eq!(registry.alias_count(), 1);
        assert_eq!(registry.resolve(" Legacy ").unwrap(), Charset::EUC_JP);
    }
}
