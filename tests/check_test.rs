use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use tscat::{run_check, CheckSettings, Checker, Severity, Translator, TsParser};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_fixture_diagnostics() {
    let report = run_check(&[fixture("qtiplot_fr.ts")], &CheckSettings::default()).unwrap();

    assert_eq!(report.count(Severity::Error), 1);
    assert_eq!(report.count(Severity::Warning), 0);
    assert_eq!(report.count(Severity::Info), 2);

    let duplicate = report
        .diagnostics
        .iter()
        .find(|d| d.rule == "duplicate-message")
        .unwrap();
    assert_eq!(duplicate.line, 11);
    assert_eq!(duplicate.context.as_deref(), Some("@default"));
    assert!(duplicate.location.as_ref().unwrap().is_unlinked());
}

#[test]
fn test_custom_location_patterns() {
    let settings = CheckSettings {
        location_patterns: vec!["../src/plot2D/*.cpp".to_string()],
        ..Default::default()
    };
    let report = run_check(&[fixture("clean_fr.ts")], &settings).unwrap();

    assert_eq!(report.count(Severity::Warning), 3);
    assert!(report
        .diagnostics
        .iter()
        .all(|d| d.rule == "location-pattern"));
    assert!(report.diagnostics[0]
        .message
        .contains("'../src/PlotDialog.cpp' does not match ../src/plot2D/*.cpp"));
}

#[test]
fn test_translation_heuristics() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heuristics_fr.ts");
    fs::write(
        &path,
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="fr">
<context>
    <name>ExportDialog</name>
    <message>
        <source>&amp;Export</source>
        <translation>Exporter</translation>
    </message>
    <message>
        <source>Saved %1 of %2 rows</source>
        <translation>%1 lignes enregistrées</translation>
    </message>
    <message>
        <source>Are you sure?</source>
        <translation>Êtes-vous sûr</translation>
    </message>
    <message>
        <source>Separator </source>
        <translation>Séparateur</translation>
    </message>
    <message>
        <source>Close</source>
        <translation></translation>
    </message>
</context>
</TS>
"#,
    )
    .unwrap();

    let checker = Checker::new(&CheckSettings::default()).unwrap();
    let diagnostics = checker.check_file(&path);
    let rules: Vec<&str> = diagnostics.iter().map(|d| d.rule).collect();

    assert_eq!(
        rules,
        vec![
            "accelerator",
            "place-marker",
            "ending-punctuation",
            "surrounding-whitespace",
            "empty-translation",
        ]
    );
    assert!(diagnostics[1].message.contains("missing %2"));
}

#[test]
fn test_translator_on_fixture() {
    let catalog = TsParser::parse_file(&fixture("qtiplot_fr.ts")).unwrap();
    let translator = Translator::new(&catalog);

    assert_eq!(translator.language(), Some("fr"));
    assert_eq!(translator.translate("@default", "&Yes", None), "&Oui");
    assert_eq!(
        translator.translate("ApplicationWindow", "Export to ASCII", None),
        "Export to ASCII"
    );
    assert_eq!(
        translator.translate("FitDialog", "Fit Wizard", None),
        "Assistant d'ajustement"
    );
    assert_eq!(
        translator.translate_plural("FitDialog", "%n parameter(s)", None, 0),
        "%n paramètre"
    );
}
