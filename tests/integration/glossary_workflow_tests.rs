/*!
 * Glossary import, export and migration through the settings store
 */

use anyhow::Result;

use subweave::app_config::{load_settings, Config, JsonFileSettingsStore, SettingsStore};
use subweave::glossary::{
    create_glossary, export_glossary, export_glossary_csv, find_glossary, import_glossary,
    import_glossary_from_csv, upsert_glossary,
};
use subweave::language_utils::ScriptDetector;
use subweave::validation::TerminologyChecker;

use crate::common;

#[test]
fn test_csvFile_importSaveReload_shouldPersistGlossary() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let csv_path = common::create_test_file(
        dir.path(),
        "anime.csv",
        "term,translation,notes\nNakama,伙伴,friends\n\"Devil Fruit\",恶魔果实,\n",
    )?;
    let store = JsonFileSettingsStore::new(dir.path().join("settings.json"));

    let text = std::fs::read_to_string(&csv_path)?;
    let glossary = import_glossary_from_csv(&text, "anime.csv")?;
    let id = glossary.id.clone();

    let mut config = Config::default();
    config.active_glossary_id = Some(id.clone());
    upsert_glossary(&mut config.glossaries, glossary);
    store.save(&config)?;

    let reloaded = load_settings(&store, &ScriptDetector, None)?;
    let active = reloaded.active_glossary().expect("active glossary");
    assert_eq!(active.name, "anime");
    assert_eq!(active.terms.len(), 2);
    // The upgrade tagged the glossary from its translations
    assert_eq!(active.target_language.as_deref(), Some("zh"));
    assert!(find_glossary(&reloaded.glossaries, &id).is_some());
    Ok(())
}

#[test]
fn test_jsonExport_shouldImportIntoAnotherLibrary() -> Result<()> {
    let mut glossary = common::sample_glossary();
    glossary.name = "Travel".to_string();
    let exported = export_glossary(&glossary);

    let mut library = vec![create_glossary("Existing", None)];
    let imported = import_glossary(&exported)?;
    upsert_glossary(&mut library, imported.clone());

    assert_eq!(library.len(), 2);
    assert_ne!(imported.id, glossary.id);
    assert_eq!(imported.terms, glossary.terms);
    Ok(())
}

#[test]
fn test_csvExport_shouldFeedTerminologyChecker() -> Result<()> {
    let csv = export_glossary_csv(&common::sample_glossary());
    let reimported = import_glossary_from_csv(&csv, "sample.csv")?;

    let checker = TerminologyChecker::new(reimported.terms);
    let issues = checker.check(&common::sample_subtitles());

    assert_eq!(issues.len(), 2);
    Ok(())
}
