//! Locale catalog management for Phrasebook.
//!
//! A [`MessageCatalog`] owns one compiled catalog per locale, loaded from
//! JSON pack files whose string values are ICU message patterns. Every
//! pattern is compiled through `phrasebook_format` at load time, so syntax
//! problems (unbalanced braces, a missing `other` case) surface as load
//! errors instead of at render time. Lookups try the active locale, then the
//! fallback locale, then return the key itself so the UI never loses a
//! label entirely.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use icu_locid::{Locale, ParserError as LocaleParserError};
use phrasebook_format::{MessageArgs, MessageFormat, PatternError};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_LOCALE_CODE: &str = "en-US";
const DEFAULT_DISPLAY_NAME: &str = "English (en-US)";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to enumerate locale directory {0}: {1}")]
    ReadDir(PathBuf, io::Error),
    #[error("failed to read locale file {0}: {1}")]
    ReadFile(PathBuf, io::Error),
    #[error("failed to parse locale file {0}: {1}")]
    ParseFile(PathBuf, serde_json::Error),
    #[error("duplicate locale code {0}")]
    DuplicateLocale(String),
    #[error("locale {locale} message '{key}' has a malformed pattern: {source}")]
    BadPattern {
        locale: String,
        key: String,
        #[source]
        source: PatternError,
    },
    #[error("locale identifier '{locale}' is invalid: {error}")]
    InvalidLocaleIdentifier {
        locale: String,
        error: LocaleParserError,
    },
}

#[derive(Debug, Clone)]
pub struct LocaleSummary {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub code: String,
    pub display_name: String,
    pub total_entries: usize,
    pub plural_entries: usize,
}

#[derive(Debug)]
struct LocaleCatalog {
    summary: LocaleSummary,
    messages: HashMap<String, MessageFormat>,
}

/// Per-locale message catalogs with an active and a fallback locale.
#[derive(Debug)]
pub struct MessageCatalog {
    catalogs: Vec<LocaleCatalog>,
    active: usize,
    fallback: usize,
}

#[derive(Debug, Deserialize)]
struct LocaleFile {
    locale: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    strings: HashMap<String, String>,
}

impl MessageCatalog {
    /// Constructs a catalog containing only an empty default locale.
    /// （建立僅含預設語系的空訊息目錄。）
    pub fn new() -> Self {
        Self {
            catalogs: vec![LocaleCatalog {
                summary: LocaleSummary {
                    code: DEFAULT_LOCALE_CODE.to_string(),
                    display_name: DEFAULT_DISPLAY_NAME.to_string(),
                },
                messages: HashMap::new(),
            }],
            active: 0,
            fallback: 0,
        }
    }

    /// Loads locale packs from the provided directory, falling back to the
    /// default locale for missing keys.
    /// （從指定目錄載入語言包，缺少鍵時回退至預設語系。）
    pub fn load_from_dir(
        path: impl AsRef<Path>,
        default_locale: &str,
    ) -> Result<Self, CatalogError> {
        Self::load_from_dirs(std::iter::once(path), default_locale)
    }

    /// Loads locale packs from multiple directories in order.
    /// （依序從多個目錄載入語言包。）
    pub fn load_from_dirs<I, P>(paths: I, default_locale: &str) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = Self::new();
        for path in paths {
            catalog.load_directory(path.as_ref())?;
        }
        catalog.apply_default_locale(default_locale);
        Ok(catalog)
    }

    /// Returns the index of the currently active locale.
    /// （回傳目前啟用語系的索引。）
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Returns the locale code of the active language.
    /// （回傳目前啟用語系的代碼字串。）
    pub fn active_code(&self) -> &str {
        self.catalogs[self.active].summary.code.as_str()
    }

    /// Exposes available locales (code + display name).
    /// （提供可用語系的代碼與顯示名稱。）
    pub fn locale_summaries(&self) -> Vec<LocaleSummary> {
        self.catalogs
            .iter()
            .map(|catalog| catalog.summary.clone())
            .collect()
    }

    /// Provides per-locale statistics useful for tooling.
    /// （回傳語系統計資訊，供工具使用。）
    pub fn catalog_stats(&self) -> Vec<CatalogStats> {
        self.catalogs
            .iter()
            .map(|catalog| CatalogStats {
                code: catalog.summary.code.clone(),
                display_name: catalog.summary.display_name.clone(),
                total_entries: catalog.messages.len(),
                plural_entries: catalog
                    .messages
                    .values()
                    .filter(|message| message.has_plural())
                    .count(),
            })
            .collect()
    }

    /// Returns missing keys for the provided locale relative to the
    /// fallback locale, or `None` for an unknown locale code.
    /// （比對預設語系，回傳指定語系缺少的鍵。）
    pub fn missing_keys(&self, code: &str) -> Option<Vec<String>> {
        let fallback_keys = {
            let mut keys: Vec<_> = self.catalogs[self.fallback]
                .messages
                .keys()
                .cloned()
                .collect();
            keys.sort();
            keys
        };
        let catalog = self
            .catalogs
            .iter()
            .find(|catalog| catalog.summary.code == code)?;
        let mut missing = Vec::new();
        for key in fallback_keys {
            if !catalog.messages.contains_key(&key) {
                missing.push(key);
            }
        }
        Some(missing)
    }

    /// Switches the active locale by index.
    /// （依索引切換目前啟用的語系。）
    pub fn set_active_by_index(&mut self, index: usize) -> bool {
        if index < self.catalogs.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Switches the active locale by locale code.
    /// （依語系代碼切換目前啟用的語系。）
    pub fn set_active_by_code(&mut self, code: &str) -> bool {
        if let Some(index) = self
            .catalogs
            .iter()
            .position(|catalog| catalog.summary.code == code)
        {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Formats a message with no parameters, falling back to the default
    /// locale and finally to the key itself.
    /// （取得指定鍵的在地化字串，若缺少則回退。）
    pub fn text(&self, key: &str) -> String {
        self.text_with_args(key, &MessageArgs::new())
    }

    /// Formats a message with the provided parameters.
    /// （取得在地化字串，必要時套用參數。）
    pub fn text_with_args(&self, key: &str, args: &MessageArgs) -> String {
        if let Some(message) = self.catalogs[self.active].messages.get(key) {
            message.format(args)
        } else if let Some(message) = self.catalogs[self.fallback].messages.get(key) {
            message.format(args)
        } else {
            key.to_string()
        }
    }

    /// Formats a message with a `count` parameter injected, for the common
    /// pluralized-label case.
    /// （取得在地化字串並代入數量參數。）
    pub fn text_with_count(&self, key: &str, count: i64) -> String {
        self.text_with_args(key, &MessageArgs::new().set("count", count))
    }

    /// Returns the locale code configured as fallback.
    /// （回傳用作回退的語系代碼。）
    pub fn fallback_code(&self) -> &str {
        self.catalogs[self.fallback].summary.code.as_str()
    }

    /// Returns true if the specified locale provides the given key.
    /// （檢查指定語系是否存在特定鍵。）
    pub fn locale_has_key(&self, code: &str, key: &str) -> bool {
        self.catalogs
            .iter()
            .find(|catalog| catalog.summary.code == code)
            .and_then(|catalog| catalog.messages.get(key))
            .is_some()
    }

    fn load_directory(&mut self, dir: &Path) -> Result<(), CatalogError> {
        match fs::read_dir(dir) {
            Ok(entries) => {
                for entry in entries {
                    let entry =
                        entry.map_err(|err| CatalogError::ReadDir(dir.to_path_buf(), err))?;
                    let path = entry.path();
                    let metadata = entry
                        .metadata()
                        .map_err(|err| CatalogError::ReadFile(path.clone(), err))?;
                    if !metadata.is_file() {
                        continue;
                    }
                    if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                        continue;
                    }

                    let contents = fs::read_to_string(&path)
                        .map_err(|err| CatalogError::ReadFile(path.clone(), err))?;
                    let file: LocaleFile = serde_json::from_str(&contents)
                        .map_err(|err| CatalogError::ParseFile(path.clone(), err))?;
                    let display_name = file
                        .display_name
                        .clone()
                        .unwrap_or_else(|| file.locale.clone());

                    let messages = compile_messages(&file.locale, file.strings)?;

                    if file.locale == self.catalogs[self.fallback].summary.code {
                        let fallback = &mut self.catalogs[self.fallback];
                        fallback.summary.display_name = display_name;
                        fallback.messages.extend(messages);
                    } else {
                        if self
                            .catalogs
                            .iter()
                            .any(|catalog| catalog.summary.code == file.locale)
                        {
                            return Err(CatalogError::DuplicateLocale(file.locale));
                        }
                        self.catalogs.push(LocaleCatalog {
                            summary: LocaleSummary {
                                code: file.locale,
                                display_name,
                            },
                            messages,
                        });
                    }
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                // Directory missing is acceptable; the default catalog is
                // already in place.
            }
            Err(err) => return Err(CatalogError::ReadDir(dir.to_path_buf(), err)),
        }
        Ok(())
    }

    fn apply_default_locale(&mut self, default_locale: &str) {
        if let Some(index) = self
            .catalogs
            .iter()
            .position(|catalog| catalog.summary.code == default_locale)
        {
            self.fallback = index;
        }
        self.active = self.fallback;
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles every pattern of a pack with the locale's own plural rules and
/// digit grouping.
fn compile_messages(
    locale_code: &str,
    entries: HashMap<String, String>,
) -> Result<HashMap<String, MessageFormat>, CatalogError> {
    let locale =
        Locale::from_str(locale_code).map_err(|error| CatalogError::InvalidLocaleIdentifier {
            locale: locale_code.to_string(),
            error,
        })?;
    let mut messages = HashMap::new();
    for (key, pattern) in entries {
        let message = MessageFormat::with_locale(&pattern, &locale).map_err(|source| {
            CatalogError::BadPattern {
                locale: locale_code.to_string(),
                key: key.clone(),
                source,
            }
        })?;
        messages.insert(key, message);
    }
    Ok(messages)
}
