/*!
 * Tests for the consistency and terminology checks
 */

use subweave::glossary::GlossaryItem;
use subweave::validation::{
    check_terminology, ConsistencyIssueKind, ConsistencyValidator, Severity, TerminologyChecker,
};

use crate::common;

#[test]
fn test_consistency_sampleEpisode_shouldFlagEachDefect() {
    let issues = ConsistencyValidator::new().validate(&common::sample_subtitles());

    let found: Vec<(&str, ConsistencyIssueKind)> =
        issues.iter().map(|i| (i.subtitle_id.as_str(), i.kind)).collect();
    assert_eq!(
        found,
        vec![
            ("s1", ConsistencyIssueKind::Punctuation),
            ("s2", ConsistencyIssueKind::Spacing),
        ]
    );
}

#[test]
fn test_consistency_eachRule_shouldProduceExactlyOneIssue() {
    let cases = [
        ("你好,世界", ConsistencyIssueKind::Punctuation, Severity::Low),
        ("hello世界", ConsistencyIssueKind::Spacing, Severity::Low),
        ("（测试", ConsistencyIssueKind::Brackets, Severity::High),
    ];

    for (text, kind, severity) in cases {
        let issues = ConsistencyValidator::new().validate(&[common::subtitle("x", 0.0, "src", text)]);
        assert_eq!(issues.len(), 1, "{}", text);
        assert_eq!(issues[0].kind, kind);
        assert_eq!(issues[0].severity, severity);
    }

    let long = "这是一个非常长的字幕句子需要被拆分成两行才可以在屏幕上正常显示出来谢谢大家的观看";
    assert!(long.chars().count() > 35);
    let issues = ConsistencyValidator::new().validate(&[common::subtitle("x", 0.0, "src", long)]);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, ConsistencyIssueKind::Length);
    assert_eq!(issues[0].severity, Severity::Medium);
}

#[test]
fn test_consistency_latinOnlyTranslation_shouldNotFlagPunctuation() {
    let issues = ConsistencyValidator::new().validate(&[common::subtitle("x", 0.0, "src", "Hello, world.")]);
    assert!(issues.is_empty());
}

#[test]
fn test_terminology_sampleEpisode_shouldReportSparseMisses() {
    let glossary = common::sample_glossary();

    let issues = check_terminology(&glossary.terms, &common::sample_subtitles());

    // "Tokyo" is also missing its translation; "Foo" is missing in s3
    assert_eq!(issues.len(), 2);
    let foo = issues.iter().find(|i| i.term == "Foo").unwrap();
    assert_eq!(foo.expected, "福");
    assert_eq!(foo.occurrences.len(), 1);
    assert_eq!(foo.occurrences[0].subtitle_id, "s3");
}

#[test]
fn test_terminology_fooExample_shouldMatchContract() {
    let checker = TerminologyChecker::new(vec![GlossaryItem::validated("Foo", "福", None).unwrap()]);

    let miss = checker.check(&[common::subtitle("a", 0.0, "Foo bar", "巴")]);
    assert_eq!(miss.len(), 1);
    assert_eq!(miss[0].occurrences.len(), 1);

    assert!(checker.check(&[common::subtitle("b", 0.0, "no match", "anything")]).is_empty());
}

#[test]
fn test_terminology_substringContainment_shouldAcceptCoincidentalMatch() {
    let checker = TerminologyChecker::new(vec![GlossaryItem::validated("fortune", "福", None).unwrap()]);
    // 幸福 contains 福 even though it is a different word
    assert!(checker.check(&[common::subtitle("a", 0.0, "Good fortune", "幸福")]).is_empty());
}

#[test]
fn test_terminologyChecker_setGlossary_shouldReplaceTerms() {
    let mut checker = TerminologyChecker::default();
    assert!(checker.check(&common::sample_subtitles()).is_empty());

    checker.set_glossary(common::sample_glossary().terms);
    assert_eq!(checker.glossary().len(), 2);
    assert_eq!(checker.check(&common::sample_subtitles()).len(), 2);
}
