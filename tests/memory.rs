//! The retained-memory bound: processing N concatenated records keeps the
//! live element count at O(one record), because each subtree is dropped
//! before the next is materialized.
//!
//! This is the only test in this binary on purpose; the live-element gauge is
//! process-global, and concurrent tests allocating their own subtrees would
//! make its readings meaningless.

use flatmark::extractor::Extractor;
use flatmark::tree::live_element_count;
use flatmark::{Dataset, RecordSource};
use std::io::Cursor;

fn record(n: u32) -> String {
    format!(
        r#"<tmk:TrademarkBag
        xmlns:tmk="http://www.wipo.int/standards/XMLSchema/ST96/Trademark"
        xmlns:com="http://www.wipo.int/standards/XMLSchema/ST96/Common">
      <tmk:Trademark>
        <com:ApplicationNumber>
          <com:ST13ApplicationNumber>CA50000{n:05}0101</com:ST13ApplicationNumber>
        </com:ApplicationNumber>
        <tmk:MarkSignificantVerbalElementText>MARK {n}</tmk:MarkSignificantVerbalElementText>
      </tmk:Trademark>
    </tmk:TrademarkBag>
"#
    )
}

#[test]
fn live_elements_stay_bounded_across_many_records() {
    let collection: String = (0..200).map(record).collect();
    let single_record_elements = 5;

    let baseline = live_element_count();
    let extractor = Extractor::new(Dataset::Main.schema().unwrap());
    let mut source = RecordSource::from_reader(Cursor::new(collection.into_bytes()));
    let mut rows_seen = 0u64;
    let mut peak = 0usize;

    for record in &mut source {
        let record = record.unwrap();
        peak = peak.max(live_element_count() - baseline);
        if let Some(rows) = extractor.extract_record(&record) {
            rows_seen += rows.len() as u64;
        }
        drop(record);
        // once the subtree is gone, nothing from this record is retained
        assert_eq!(live_element_count(), baseline);
    }

    assert_eq!(rows_seen, 200);
    assert!(
        peak <= single_record_elements,
        "peak live elements {peak} exceeds one record's size"
    );
}
