use bloat_core::aggregate::attribute;
use bloat_core::report::{format_bytes, format_percent, render_report};
use bloat_core::symbols::{parse_size_report, SymbolTable};

mod common;
use common::unit;

const EXPECTED: &str = "\
Function size by unit
Unit         Strong  Strong %  +Weak  +Weak %
a               100     66.7%    100    66.7%
(aggregate)     100     66.7%    100    66.7%

Data size by unit
Unit         Data  Data %
a              20  100.0%
(aggregate)    20  100.0%

Total strong function size: 100 of 150 bytes (66.7%)
Total function size (including weak): 100 of 150 bytes (66.7%)
Total public data size: 20 of 20 bytes (100.0%)
Unattributable local data size: 0 of 20 bytes (0.0%)
";

#[test]
fn renders_tables_and_summary() {
    let table = parse_size_report("foo,0,100\nbar,0,50\n.rodata.baz,0,20\n").unwrap();
    let report = attribute(&[unit("a", "0 T foo\n0 D baz\n")], &table);
    assert_eq!(render_report(&report), EXPECTED);
}

#[test]
fn rendering_is_deterministic() {
    let table: SymbolTable =
        [("f1", 10), ("f2", 20), ("f3", 30), (".data.d", 4)].into_iter().collect();
    let units = vec![
        unit("x.a", "0 T f1\n0 T f2\n"),
        unit("y.a", "0 T f3\n0 D d\n"),
        unit("z.a", "0 W f1\n"),
    ];
    let first = render_report(&attribute(&units, &table));
    let second = render_report(&attribute(&units, &table));
    assert_eq!(first, second);
}

#[test]
fn empty_table_renders_zero_percentages() {
    let report = attribute(&[unit("a", "0 T foo\n")], &SymbolTable::new());
    let text = render_report(&report);
    assert!(text.contains("Total strong function size: 0 of 0 bytes (0.0%)"), "{text}");
    assert!(text.contains("Unattributable local data size: 0 of 0 bytes (0.0%)"), "{text}");
}

#[test]
fn formats_bytes_with_thousands_separators() {
    assert_eq!(format_bytes(0), "0");
    assert_eq!(format_bytes(999), "999");
    assert_eq!(format_bytes(1_000), "1,000");
    assert_eq!(format_bytes(1_234_567), "1,234,567");
}

#[test]
fn formats_percent_with_one_decimal() {
    assert_eq!(format_percent(1, 3), "33.3%");
    assert_eq!(format_percent(2, 3), "66.7%");
    assert_eq!(format_percent(5, 0), "0.0%");
}
