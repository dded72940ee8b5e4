/*!
 * Tests for chunk planning and duration-budget selection
 */

use subweave::pipeline::{plan_chunks, select_chunks_by_duration, ChunkSpec, DurationBudget};

#[test]
fn test_planChunks_exactMultiple_shouldHaveNoShortTail() {
    let chunks = plan_chunks(600.0, 120.0).unwrap();
    assert_eq!(chunks.len(), 5);
    assert!(chunks.iter().all(|c| c.duration() == 120.0));
}

#[test]
fn test_select_prefixProperty_shouldHoldAcrossChunkLengths() {
    for chunk_len in [30.0, 60.0, 300.0, 450.0] {
        let chunks = plan_chunks(5400.0, chunk_len).unwrap();
        for minutes in [0.1, 1.0, 4.5, 15.0, 89.0, 200.0] {
            let selected = select_chunks_by_duration(&chunks, DurationBudget::Minutes(minutes), chunk_len);
            let needed = ((minutes * 60.0) / chunk_len).ceil() as usize;

            assert_eq!(selected.len(), needed.min(chunks.len()));
            assert!(!selected.is_empty());
            assert_eq!(&chunks[..selected.len()], &selected[..]);
        }
    }
}

#[test]
fn test_select_nonPositiveBudget_shouldSelectNothing() {
    let chunks = plan_chunks(900.0, 300.0).unwrap();
    assert!(select_chunks_by_duration(&chunks, DurationBudget::Minutes(0.0), 300.0).is_empty());
    assert!(select_chunks_by_duration(&chunks, DurationBudget::Minutes(-3.0), 300.0).is_empty());
}

#[test]
fn test_select_emptyInput_shouldReturnEmpty() {
    let chunks: Vec<ChunkSpec> = Vec::new();
    assert!(select_chunks_by_duration(&chunks, DurationBudget::All, 300.0).is_empty());
    assert!(select_chunks_by_duration(&chunks, DurationBudget::Minutes(5.0), 300.0).is_empty());
}

#[test]
fn test_durationBudget_parseAndSerde_shouldAcceptAllOrMinutes() {
    assert_eq!("all".parse::<DurationBudget>().unwrap(), DurationBudget::All);
    assert_eq!(" ALL ".parse::<DurationBudget>().unwrap(), DurationBudget::All);
    assert_eq!("7.5".parse::<DurationBudget>().unwrap(), DurationBudget::Minutes(7.5));
    assert!("soon".parse::<DurationBudget>().is_err());

    assert_eq!(serde_json::to_string(&DurationBudget::All).unwrap(), "\"all\"");
    assert_eq!(serde_json::from_str::<DurationBudget>("20").unwrap(), DurationBudget::Minutes(20.0));
    assert!(serde_json::from_str::<DurationBudget>("\"later\"").is_err());
}
