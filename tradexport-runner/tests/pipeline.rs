//! End-to-end pipeline runs against an in-memory importer.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tradexport_core::convert::kucoin_cointracking;
use tradexport_core::importer::{KuCoinImporter, KuCoinTransport};
use tradexport_core::{
    CancelFlag, ChunkWindow, CoinTrackingField, ConvertError, Converter, Credentials,
    CsvExporter, Field, Format, ImportError, Importer, KuCoinField, Record, Rule,
    TransportError,
};
use tradexport_runner::{
    spawn_pipeline, CollectingSink, ExportConfig, Pipeline, PipelineError, PipelineSettings,
};

fn fill(symbol: &str, n: usize) -> Record {
    Record::builder(Format::KuCoin)
        .set(KuCoinField::TradeId, format!("{symbol}-{n}"))
        .set(KuCoinField::OrderId, format!("o-{n}"))
        .set(KuCoinField::Symbol, symbol)
        .set(KuCoinField::Side, if n % 2 == 0 { "buy" } else { "sell" })
        .set(KuCoinField::Price, Decimal::new(40_000, 0))
        .set(KuCoinField::Size, Decimal::new(1, 2))
        .set(KuCoinField::Fee, Decimal::new(4, 1))
        .set(KuCoinField::FeeCurrency, "USDT")
        .set(
            KuCoinField::CreatedAt,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, n as u32).unwrap(),
        )
        .build()
        .unwrap()
}

/// Serves a fixed number of fills per symbol. Optionally raises the cancel
/// flag after a given symbol has been imported, or fails on one symbol.
#[derive(Default)]
struct MemoryImporter {
    symbols: Vec<(String, usize)>,
    cancel_after: Option<(String, CancelFlag)>,
    fail_on: Option<String>,
    drop_field: Option<KuCoinField>,
    imported: Mutex<Vec<String>>,
}

impl MemoryImporter {
    fn new(symbols: &[(&str, usize)]) -> Self {
        Self {
            symbols: symbols.iter().map(|(s, n)| (s.to_string(), *n)).collect(),
            ..Self::default()
        }
    }
}

impl Importer for MemoryImporter {
    fn format(&self) -> Format {
        Format::KuCoin
    }

    fn list_symbols(&self, _: &Credentials) -> Result<Vec<String>, ImportError> {
        Ok(self.symbols.iter().map(|(s, _)| s.clone()).collect())
    }

    fn import_chunks(
        &self,
        _: &Credentials,
        symbol: &str,
        _: ChunkWindow,
        _: &CancelFlag,
    ) -> Result<Vec<Record>, ImportError> {
        self.imported.lock().unwrap().push(symbol.to_string());
        if self.fail_on.as_deref() == Some(symbol) {
            return Err(TransportError::Status {
                status: 503,
                path: "/api/v1/fills".into(),
                body: "maintenance".into(),
            }
            .into());
        }
        let n = self
            .symbols
            .iter()
            .find(|(s, _)| s == symbol)
            .map_or(0, |(_, n)| *n);
        let records = (0..n)
            .map(|i| {
                let full = fill(symbol, i);
                match self.drop_field {
                    Some(dropped) => {
                        let mut b = Record::builder(Format::KuCoin);
                        for (f, v) in full.iter().filter(|(f, _)| **f != Field::KuCoin(dropped)) {
                            b.insert(*f, v.clone());
                        }
                        b.build().unwrap()
                    }
                    None => full,
                }
            })
            .collect();
        if let Some((after, flag)) = &self.cancel_after {
            if after == symbol {
                flag.cancel();
            }
        }
        Ok(records)
    }

    fn import_file(&self, _: &[Field], _: &Path) -> Result<Vec<Record>, ImportError> {
        Ok(Vec::new())
    }
}

fn pipeline(importer: MemoryImporter) -> Pipeline {
    Pipeline::new(
        Box::new(importer),
        Converter::new(),
        Box::new(CsvExporter::default()),
    )
}

fn settings(out: &Path) -> PipelineSettings {
    PipelineSettings::new(Credentials::new("key", "secret", "pass"))
        .with_output(Some(out.to_path_buf()))
}

#[test]
fn two_symbols_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let sink = CollectingSink::new();

    let outcome = pipeline(MemoryImporter::new(&[("BTC-USDT", 2), ("ETH-USDT", 0)]))
        .run(&settings(&out), &sink, &CancelFlag::new())
        .unwrap();

    assert_eq!(outcome.records, 2);
    assert_eq!(outcome.path, out);

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Type,Buy Amount,Buy Currency,Sell Amount,Sell Currency,Fee,Fee Currency,Exchange,Trade-Group,Comment,Date"
    );
    assert_eq!(
        lines[1],
        "Trade,0.01,BTC,400,USDT,0.4,USDT,KuCoin,,\"tradeId BTC-USDT-0, order o-0\",2024-01-01 00:00:00"
    );

    let messages = sink.messages();
    assert_eq!(
        messages,
        vec![
            "Importing was started...".to_string(),
            "Importing trades for symbol BTC-USDT".into(),
            "Imported trades: 2".into(),
            "Importing trades for symbol ETH-USDT".into(),
            "Imported trades: 0".into(),
            "2 records were imported".into(),
            "Starting conversion...".into(),
            format!("Records were saved to path: {}", out.display()),
        ]
    );
    let btc = messages
        .iter()
        .filter(|m| *m == "Importing trades for symbol BTC-USDT")
        .count();
    assert_eq!(btc, 1);
}

#[test]
fn cancel_between_symbols_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let cancel = CancelFlag::new();
    let mut importer = MemoryImporter::new(&[("BTC-USDT", 3), ("ETH-USDT", 3), ("KCS-USDT", 3)]);
    importer.cancel_after = Some(("BTC-USDT".into(), cancel.clone()));
    let sink = CollectingSink::new();

    let err = pipeline(importer)
        .run(&settings(&out), &sink, &cancel)
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!out.exists());
    assert!(!sink
        .messages()
        .iter()
        .any(|m| m.contains("ETH-USDT") || m.starts_with("Records were saved")));
}

#[test]
fn cancel_leaves_existing_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    std::fs::write(&out, "previous export\n").unwrap();
    let cancel = CancelFlag::new();
    let mut importer = MemoryImporter::new(&[("BTC-USDT", 1), ("ETH-USDT", 1)]);
    importer.cancel_after = Some(("ETH-USDT".into(), cancel.clone()));

    let err = pipeline(importer)
        .run(&settings(&out), &CollectingSink::new(), &cancel)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Cancelled));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "previous export\n");
}

#[test]
fn missing_source_field_fails_before_export() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let mut importer = MemoryImporter::new(&[("BTC-USDT", 2)]);
    importer.drop_field = Some(KuCoinField::CreatedAt);

    let err = pipeline(importer)
        .run(&settings(&out), &CollectingSink::new(), &CancelFlag::new())
        .unwrap_err();

    match err {
        PipelineError::Convert(ConvertError::MissingField { field, record }) => {
            assert_eq!(field, Field::KuCoin(KuCoinField::CreatedAt));
            assert_eq!(record, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out.exists());
}

#[test]
fn table_without_date_rule_fails_before_export() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let date = Field::CoinTracking(CoinTrackingField::Date);
    let mut table = kucoin_cointracking::table();
    table
        .rules
        .retain(|r| !matches!(r, Rule::Reformat { to, .. } if *to == date));
    let mut converter = Converter::empty();
    converter.register(table);
    let pipeline = Pipeline::new(
        Box::new(MemoryImporter::new(&[("BTC-USDT", 2)])),
        converter,
        Box::new(CsvExporter::default()),
    );
    let sink = CollectingSink::new();

    let err = pipeline
        .run(&settings(&out), &sink, &CancelFlag::new())
        .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Convert(ConvertError::MissingField { field, record: 0 }) if field == date
    ));
    assert!(!out.exists());
    assert!(!sink.messages().iter().any(|m| m.starts_with("Records were saved")));
}

/// Answers the symbol list and records every other request.
#[derive(Default)]
struct SymbolsOnlyTransport {
    other_requests: Arc<Mutex<Vec<String>>>,
}

impl KuCoinTransport for SymbolsOnlyTransport {
    fn get(
        &self,
        _: Option<&Credentials>,
        path: &str,
        _: &[(&str, String)],
    ) -> Result<String, TransportError> {
        if path.ends_with("/symbols") {
            return Ok(r#"{"code":"200000","data":[{"symbol":"BTC-USDT","enableTrading":true}]}"#
                .to_string());
        }
        self.other_requests.lock().unwrap().push(path.to_string());
        Err(TransportError::Status {
            status: 500,
            path: path.to_string(),
            body: "unexpected request".into(),
        })
    }
}

#[test]
fn inverted_config_window_exports_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let config = ExportConfig::from_toml(
        Path::new("inverted.toml"),
        "[export]\nsince = \"2024-02-01\"\nbefore = \"2024-01-01\"\n",
    )
    .unwrap();
    let transport = SymbolsOnlyTransport::default();
    let other_requests = Arc::clone(&transport.other_requests);
    let importer = KuCoinImporter::new(transport, config.kucoin.clone())
        .with_now(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    let pipeline = Pipeline::new(
        Box::new(importer),
        Converter::new(),
        Box::new(CsvExporter::default()),
    );

    let outcome = pipeline
        .run(
            &settings(&out).with_window(config.window()),
            &CollectingSink::new(),
            &CancelFlag::new(),
        )
        .unwrap();

    assert_eq!(outcome.records, 0);
    assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 1);
    assert!(other_requests.lock().unwrap().is_empty());
}

#[test]
fn transport_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades.csv");
    let mut importer = MemoryImporter::new(&[("BTC-USDT", 1), ("ETH-USDT", 1), ("KCS-USDT", 1)]);
    importer.fail_on = Some("ETH-USDT".into());
    let sink = CollectingSink::new();

    let p = pipeline(importer);
    let err = p.run(&settings(&out), &sink, &CancelFlag::new()).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Transport(TransportError::Status { status: 503, .. })
    ));
    assert!(!out.exists());
    assert!(sink
        .messages()
        .contains(&"Importing trades for symbol ETH-USDT".to_string()));
    assert!(!sink.messages().iter().any(|m| m.contains("KCS-USDT")));
}

#[test]
fn no_symbols_gives_header_only_file() {
    let dir = tempfile::tempdir().unwrap();
    let sink = CollectingSink::new();

    let outcome = pipeline(MemoryImporter::new(&[]))
        .run(
            &settings(dir.path()).with_output(Some(dir.path().to_path_buf())),
            &sink,
            &CancelFlag::new(),
        )
        .unwrap();

    assert_eq!(outcome.path, dir.path().join("records.csv"));
    assert_eq!(
        std::fs::read_to_string(&outcome.path).unwrap().lines().count(),
        1
    );
    assert!(sink.messages().contains(&"0 records were imported".to_string()));
}

#[test]
fn worker_streams_progress_and_returns_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("trades");
    let handle = spawn_pipeline(
        pipeline(MemoryImporter::new(&[("BTC-USDT", 4)])),
        settings(&out),
    )
    .unwrap();

    let lines: Vec<String> = handle.progress().iter().collect();
    let (result, _) = handle.join();

    let outcome = result.unwrap();
    assert_eq!(outcome.path, dir.path().join("trades.csv"));
    assert_eq!(outcome.records, 4);
    assert_eq!(lines.first().map(String::as_str), Some("Importing was started..."));
    assert!(lines.contains(&"Imported trades: 4".to_string()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Total imported equals the sum over symbols, and rows keep symbol order.
    #[test]
    fn import_count_is_sum_of_chunks(counts in prop::collection::vec(0usize..6, 0..5)) {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("trades.csv");
        let names: Vec<String> = (0..counts.len()).map(|i| format!("S{i}-USDT")).collect();
        let symbols: Vec<(&str, usize)> =
            names.iter().map(String::as_str).zip(counts.iter().copied()).collect();
        let sink = CollectingSink::new();

        let outcome = pipeline(MemoryImporter::new(&symbols))
            .run(&settings(&out), &sink, &CancelFlag::new())
            .unwrap();

        let total: usize = counts.iter().sum();
        prop_assert_eq!(outcome.records, total);
        let expected_total = format!("{total} records were imported");
        prop_assert!(sink.messages().contains(&expected_total));

        let mut rdr = csv::Reader::from_path(&out).unwrap();
        let comment_col = Format::CoinTracking
            .export_header()
            .iter()
            .position(|f| *f == Field::CoinTracking(CoinTrackingField::Comment))
            .unwrap();
        let order: Vec<String> = rdr
            .records()
            .map(|r| r.unwrap()[comment_col].to_string())
            .collect();
        let expected: Vec<String> = symbols
            .iter()
            .flat_map(|(name, n)| (0..*n).map(move |i| format!("tradeId {name}-{i}, order o-{i}")))
            .collect();
        prop_assert_eq!(order, expected);
    }
}
