/*!
 * Tests for language utility functions
 */

use subweave::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, LanguageDetector, ScriptDetector,
};

/// Test normalization of language codes to their shortest form
#[test]
fn test_normalize_withValidCodes_shouldPreferPart1() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("ger").unwrap(), "de");
    assert_eq!(normalize_to_part1_or_part2t(" KO ").unwrap(), "ko");

    // Invalid codes
    assert!(normalize_to_part1_or_part2t("e").is_err());
    assert!(normalize_to_part1_or_part2t("123").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withMatchingCodes_shouldReturnTrue() {
    assert!(language_codes_match("zh", "zho"));
    assert!(language_codes_match("zh", "chi"));
    assert!(language_codes_match("fra", "fre"));

    // Case insensitivity and whitespace
    assert!(language_codes_match(" EN ", "eng"));

    // Non-matches
    assert!(!language_codes_match("zh", "ja"));
    assert!(!language_codes_match("", ""));
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_withValidCodes_shouldReturnCorrectName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("fre").unwrap(), "French");
    assert_eq!(get_language_name("jpn").unwrap(), "Japanese");

    assert!(get_language_name("xyz").is_err());
}

/// Test detection on glossary-style joined translations
#[test]
fn test_scriptDetector_withMixedTranslations_shouldPickDominantScript() {
    let detector = ScriptDetector;

    assert_eq!(detector.detect("伙伴 恶魔果实 Luffy").as_deref(), Some("zh"));
    assert_eq!(detector.detect("仲間 ルフィ").as_deref(), Some("ja"));
    assert_eq!(detector.detect("동료입니다 OK").as_deref(), Some("ko"));
    assert_eq!(detector.detect("   "), None);
}
