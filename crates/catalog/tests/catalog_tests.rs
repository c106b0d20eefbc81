use std::fs;

use phrasebook_catalog::{CatalogError, MessageCatalog};
use phrasebook_format::{MessageArgs, PatternError};
use tempfile::tempdir;

#[test]
fn empty_catalog_returns_key() {
    let catalog = MessageCatalog::new();
    assert_eq!(catalog.text("menu.file"), "menu.file");
    assert_eq!(catalog.active_code(), "en-US");
    assert_eq!(catalog.fallback_code(), "en-US");
}

#[test]
fn placeholders_are_applied() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("en-US.json"),
        r#"
        {
            "locale": "en-US",
            "strings": {
                "toolbar.pinned_tabs": "Pinned tabs: {n}"
            }
        }
        "#,
    )
    .expect("write locale");

    let catalog = MessageCatalog::load_from_dir(temp.path(), "en-US").expect("load");
    assert_eq!(
        catalog.text_with_args("toolbar.pinned_tabs", &MessageArgs::new().set("n", 7i64)),
        "Pinned tabs: 7"
    );
}

#[test]
fn plural_selection_uses_locale_rules() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("ru-RU.json"),
        r#"
        {
            "locale": "ru-RU",
            "strings": {
                "notifications.count": "{count, plural, one {{count} уведомление} few {{count} уведомления} many {{count} уведомлений} other {{count} уведомления}}"
            }
        }
        "#,
    )
    .expect("write locale");

    let mut catalog = MessageCatalog::load_from_dir(temp.path(), "en-US").expect("load");
    assert!(catalog.set_active_by_code("ru-RU"));

    assert_eq!(
        catalog.text_with_count("notifications.count", 1),
        "1 уведомление"
    );
    assert_eq!(
        catalog.text_with_count("notifications.count", 3),
        "3 уведомления"
    );
    assert_eq!(
        catalog.text_with_count("notifications.count", 5),
        "5 уведомлений"
    );
    assert_eq!(
        catalog.text_with_count("notifications.count", 21),
        "21 уведомление"
    );
}

#[test]
fn select_patterns_format_through_catalog() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("en-US.json"),
        r#"
        {
            "locale": "en-US",
            "strings": {
                "invite.added": "{GENDER, select, female {{WHO} added you to her circle} other {{WHO} added you to his circle}}"
            }
        }
        "#,
    )
    .expect("write locale");

    let catalog = MessageCatalog::load_from_dir(temp.path(), "en-US").expect("load");
    assert_eq!(
        catalog.text_with_args(
            "invite.added",
            &MessageArgs::new().set("GENDER", "female").set("WHO", "Jelena"),
        ),
        "Jelena added you to her circle"
    );
}

#[test]
fn missing_key_falls_back_to_default_locale() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("en-US.json"),
        r#"{ "locale": "en-US", "strings": { "menu.file": "File", "menu.edit": "Edit" } }"#,
    )
    .expect("write en");
    fs::write(
        temp.path().join("de-DE.json"),
        r#"{ "locale": "de-DE", "strings": { "menu.file": "Datei" } }"#,
    )
    .expect("write de");

    let mut catalog = MessageCatalog::load_from_dir(temp.path(), "en-US").expect("load");
    assert!(catalog.set_active_by_code("de-DE"));
    assert_eq!(catalog.text("menu.file"), "Datei");
    assert_eq!(catalog.text("menu.edit"), "Edit");
    assert_eq!(catalog.text("menu.unknown"), "menu.unknown");

    let missing = catalog.missing_keys("de-DE").expect("locale present");
    assert_eq!(missing, vec!["menu.edit"]);
}

#[test]
fn malformed_pattern_fails_the_load() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("xx.json"),
        r#"
        {
            "locale": "xx",
            "strings": {
                "sample": "{n, plural, one {only one}}"
            }
        }
        "#,
    )
    .expect("write locale");

    let error = MessageCatalog::load_from_dir(temp.path(), "en-US").unwrap_err();
    match error {
        CatalogError::BadPattern { locale, key, source } => {
            assert_eq!(locale, "xx");
            assert_eq!(key, "sample");
            assert!(matches!(source, PatternError::MissingOtherCase { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn duplicate_locale_is_rejected() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("a.json"),
        r#"{ "locale": "fr-FR", "strings": { "menu.file": "Fichier" } }"#,
    )
    .expect("write a");
    fs::write(
        temp.path().join("b.json"),
        r#"{ "locale": "fr-FR", "strings": { "menu.edit": "Édition" } }"#,
    )
    .expect("write b");

    let error = MessageCatalog::load_from_dir(temp.path(), "en-US").unwrap_err();
    match error {
        CatalogError::DuplicateLocale(code) => assert_eq!(code, "fr-FR"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_locale_identifier_is_rejected() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("bad.json"),
        r#"{ "locale": "not a locale", "strings": { "k": "v" } }"#,
    )
    .expect("write locale");

    let error = MessageCatalog::load_from_dir(temp.path(), "en-US").unwrap_err();
    assert!(matches!(error, CatalogError::InvalidLocaleIdentifier { .. }));
}

#[test]
fn stats_count_plural_entries() {
    let temp = tempdir().expect("tempdir");
    fs::write(
        temp.path().join("en-US.json"),
        r#"
        {
            "locale": "en-US",
            "display_name": "English (United States)",
            "strings": {
                "menu.file": "File",
                "items.count": "{count, plural, one {# item} other {# items}}"
            }
        }
        "#,
    )
    .expect("write locale");

    let catalog = MessageCatalog::load_from_dir(temp.path(), "en-US").expect("load");
    let stats = catalog.catalog_stats();
    let en = stats
        .iter()
        .find(|stats| stats.code == "en-US")
        .expect("en-US stats");
    assert_eq!(en.display_name, "English (United States)");
    assert_eq!(en.total_entries, 2);
    assert_eq!(en.plural_entries, 1);
    assert!(catalog.locale_has_key("en-US", "items.count"));
    assert!(!catalog.locale_has_key("en-US", "items.missing"));
}

#[test]
fn missing_directory_keeps_default_catalog() {
    let temp = tempdir().expect("tempdir");
    let missing = temp.path().join("no-such-dir");
    let catalog = MessageCatalog::load_from_dir(&missing, "en-US").expect("load");
    assert_eq!(catalog.locale_summaries().len(), 1);
    assert_eq!(catalog.text("anything"), "anything");
}
