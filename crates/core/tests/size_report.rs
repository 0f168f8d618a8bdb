use std::path::Path;

use bloat_core::symbols::{
    is_data_symbol, load_symbol_table, parse_size_report, strip_data_prefix, SymbolTableError,
};

mod common;
use common::{toolchain, FakeRunner};

const BLOATY_CSV: &str = "\
symbols,vmsize,filesize
[WASM Header],0,8
[section .text],12345,
foo,0,100
bar,0,50
.rodata.baz,0,20
";

#[test]
fn parses_rows_using_file_size() {
    let table = parse_size_report("name,vmsize,filesize\nfoo,999,100\n").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("foo"), Some(100));
}

#[test]
fn skips_headers_and_marker_rows() {
    let table = parse_size_report(BLOATY_CSV).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.get("[section .text]"), None);
    assert_eq!(table.get("[WASM Header]"), None);
    assert_eq!(table.function_total(), 150);
    assert_eq!(table.data_total(), 20);
}

#[test]
fn section_header_row_is_excluded_from_denominators() {
    let table = parse_size_report("[section .text],12345,\nfoo,0,10\n").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.function_total(), 10);
    assert_eq!(table.data_total(), 0);
}

#[test]
fn skips_totals_row_and_blank_lines() {
    let table = parse_size_report("foo,0,10\n\nTOTAL,0,10\n").unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn tolerates_crlf_line_endings() {
    let table = parse_size_report("symbols,vmsize,filesize\r\nfoo,0,10\r\n").unwrap();
    assert_eq!(table.get("foo"), Some(10));
}

#[test]
fn quoted_names_may_contain_commas() {
    let table = parse_size_report("\"operator,(int, int)\",0,12\n").unwrap();
    assert_eq!(table.get("operator,(int, int)"), Some(12));
}

#[test]
fn wrong_column_count_is_fatal() {
    let err = parse_size_report("foo,0,10\nbar,0\n").unwrap_err();
    assert_eq!(
        err,
        SymbolTableError::MalformedRow { line: 2, columns: 2, content: "bar,0".to_string() }
    );
    assert!(err.to_string().contains("expected 3 columns"));
}

#[test]
fn non_numeric_size_is_fatal() {
    let err = parse_size_report("foo,0,lots\n").unwrap_err();
    assert_eq!(err, SymbolTableError::InvalidSize { line: 1, value: "lots".to_string() });
}

#[test]
fn empty_report_yields_empty_table() {
    let table = parse_size_report("symbols,vmsize,filesize\n").unwrap();
    assert!(table.is_empty());
    assert_eq!(table.function_total(), 0);
    assert_eq!(table.data_total(), 0);
}

#[test]
fn recognizes_data_section_prefixes() {
    assert_eq!(strip_data_prefix(".rodata.baz"), Some("baz"));
    assert_eq!(strip_data_prefix(".data.counter"), Some("counter"));
    assert_eq!(strip_data_prefix(".bss.buffer"), Some("buffer"));
    assert_eq!(strip_data_prefix(".rodata..L.str.1"), Some(".L.str.1"));
    assert_eq!(strip_data_prefix("foo"), None);
    assert!(!is_data_symbol(".text.foo"));
}

#[test]
fn load_symbol_table_runs_bloaty_on_the_artifact() {
    let runner = FakeRunner::new().with_output("app.wasm", BLOATY_CSV);
    let mut toolchain = toolchain(runner);
    let table = load_symbol_table(&mut toolchain, Path::new("app.wasm")).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        toolchain.runner().calls(),
        vec!["bloaty -d symbols -n 0 --demangle=none --csv app.wasm".to_string()]
    );
}

#[test]
fn load_symbol_table_surfaces_malformed_rows() {
    let runner = FakeRunner::new().with_output("app.wasm", "foo,1,2,3\n");
    let mut toolchain = toolchain(runner);
    let err = load_symbol_table(&mut toolchain, Path::new("app.wasm")).unwrap_err();
    assert!(err.to_string().contains("Malformed size report row 1"), "unexpected error: {err}");
}
