//! Full runs against a loopback image host and a temporary output folder.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{as_rows, nozzle_jam_rows, write_csv, ImageServer, IMAGE_BYTES, UNREACHABLE};
use layer_print::prompt::ScriptedPrompter;
use layer_print::{LayerProcessor, Mode, PrintRunner, RowSource, RunConfig, RunReport, Strategy, SummaryReport};
use print_artifacts::FsArtifactStore;
use print_prefetch::PrefetchConfig;
use print_transport::HttpFetcher;
use print_types::FetchPolicy;

async fn run(csv: &Path, config: RunConfig, prompter: &mut ScriptedPrompter) -> RunReport {
    let rows = RowSource::from_path(csv).unwrap();
    let fetcher = HttpFetcher::new(FetchPolicy::with_timeout_secs(5)).unwrap();
    let store = FsArtifactStore::new(&config.output_folder);
    let processor = LayerProcessor::new(Arc::new(fetcher), Arc::new(store), config.fetch.timeout);
    PrintRunner::new(config, rows, processor).run(prompter).await
}

fn assert_nozzle_jam(report: &RunReport, out: &Path) {
    let counters = &report.counters;
    assert_eq!(
        (counters.total_layers, counters.successful_layers, counters.failed_layers),
        (3, 2, 1)
    );
    assert_eq!(counters.error_log.len(), 1);
    assert!(counters.error_log[0].starts_with("Layer 3:"));
    assert!(counters.error_log[0].contains("Nozzle Jam"));

    assert_eq!(std::fs::read(out.join("layer_1/layer_1.png")).unwrap(), IMAGE_BYTES);
    assert!(!out.join("layer_2/layer_2.png").exists());
    assert_eq!(std::fs::read(out.join("layer_3/layer_3.png")).unwrap(), IMAGE_BYTES);
}

#[tokio::test(flavor = "multi_thread")]
async fn nozzle_jam_job_in_every_strategy() {
    let server = ImageServer::start();
    let strategies = [
        Strategy::Sequential { supervised: false },
        Strategy::FullConcurrency,
        Strategy::PrefetchPaced,
    ];

    for strategy in strategies {
        let dir = tempfile::tempdir().unwrap();
        let rows = nozzle_jam_rows(&server);
        let csv = write_csv(dir.path(), &as_rows(&rows));
        let out = dir.path().join("out");
        let config = RunConfig::new("Benchy", &out, Mode::Automatic).with_strategy(strategy);

        let mut prompter = ScriptedPrompter::enter_times(3);
        let report = run(&csv, config, &mut prompter).await;
        assert_nozzle_jam(&report, &out);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn layer_data_keeps_every_column_in_order() {
    let server = ImageServer::start();
    let dir = tempfile::tempdir().unwrap();
    let rows = nozzle_jam_rows(&server);
    let csv = write_csv(dir.path(), &as_rows(&rows));
    let out = dir.path().join("out");

    let mut prompter = ScriptedPrompter::default();
    run(&csv, RunConfig::new("Benchy", &out, Mode::Automatic), &mut prompter).await;

    let data = std::fs::read_to_string(out.join("layer_3/layer_data.txt")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(value["Error"], "Nozzle Jam");
    assert_eq!(value["Bed Temp"], "60");
    let layer_at = data.find("Layer Number").unwrap();
    let temp_at = data.find("Bed Temp").unwrap();
    assert!(layer_at < temp_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_image_still_persists_layer_data() {
    let server = ImageServer::start();
    let dir = tempfile::tempdir().unwrap();
    let unreachable = format!("{UNREACHABLE}/layer_1.png");
    let missing = server.url("missing/layer_2.png");
    let csv = write_csv(
        dir.path(),
        &[("1", unreachable.as_str(), "SUCCESS"), ("2", missing.as_str(), "SUCCESS")],
    );
    let out = dir.path().join("out");

    let mut prompter = ScriptedPrompter::default();
    let report = run(&csv, RunConfig::new("Benchy", &out, Mode::Automatic), &mut prompter).await;

    assert_eq!(report.counters.failed_layers, 2);
    assert!(report
        .counters
        .error_log
        .iter()
        .all(|entry| entry.contains("fetch error")));
    assert!(out.join("layer_1/layer_data.txt").exists());
    assert!(!out.join("layer_1/layer_1.png").exists());
    assert!(out.join("layer_2/layer_data.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelling_after_k_folds_exactly_k() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<(String, String, String)> = (1..=12)
        .map(|n| (n.to_string(), String::new(), "SUCCESS".to_string()))
        .collect();
    let csv = write_csv(dir.path(), &as_rows(&rows));

    for k in [0usize, 1, 4, 11] {
        let out = dir.path().join(format!("out-{k}"));
        let config = RunConfig::new("Benchy", &out, Mode::Supervised)
            .with_prefetch(PrefetchConfig::new(4, 2).unwrap());
        let mut answers = vec![""; k];
        answers.push("q");
        let mut prompter = ScriptedPrompter::new(answers);

        let report = run(&csv, config, &mut prompter).await;
        assert!(report.aborted);
        assert_eq!(report.counters.processed(), k, "k = {k}");
        assert_eq!(report.counters.successful_layers, k);
        let stats = report.prefetch.unwrap();
        assert_eq!(stats.delivered, k);
        assert!(stats.peak_in_flight <= 4);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_input_runs_to_an_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), &[]);
    let out = dir.path().join("out");

    let mut prompter = ScriptedPrompter::default();
    let report = run(&csv, RunConfig::new("Empty", &out, Mode::Supervised), &mut prompter).await;
    assert_eq!(report.counters.processed(), 0);
    assert!(!report.aborted);
    assert!(prompter.asked().is_empty());

    assert!(SummaryReport::new("Empty", report.counters).publish(&out));
    let summary = std::fs::read_to_string(out.join("print_summary.txt")).unwrap();
    assert!(summary.contains("Total Layers: 0\n"));
    assert!(summary.ends_with("Errors: []\n"));
    assert!(out.join("print_summary_chart.png").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rows_sharing_a_layer_folder_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<(String, String, String)> = (0..64)
        .map(|_| (String::new(), String::new(), "SUCCESS".to_string()))
        .collect();
    let csv = write_csv(dir.path(), &as_rows(&rows));

    for strategy in [Strategy::FullConcurrency, Strategy::PrefetchPaced] {
        for round in 0..5 {
            let out = dir.path().join(format!("out-{strategy:?}-{round}"));
            let config = RunConfig::new("Shared", &out, Mode::Automatic).with_strategy(strategy);
            let mut prompter = ScriptedPrompter::enter_times(64);

            let report = run(&csv, config, &mut prompter).await;
            assert_eq!(report.counters.failed_layers, 0, "{:?}", report.counters.error_log);
            assert_eq!(report.counters.successful_layers, 64);

            let names: Vec<_> = std::fs::read_dir(out.join("layer_unknown"))
                .unwrap()
                .map(|entry| entry.unwrap().file_name())
                .collect();
            assert_eq!(names, vec!["layer_data.txt"]);
        }
    }
}
