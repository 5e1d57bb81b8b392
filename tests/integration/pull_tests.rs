use rank_ripple::config::{load_config_with_hash, Config};
use rank_ripple::crawler::{
    run_pull, HttpPageFetcher, PullContext, PullOrchestrator, RankCollector, TermFailure,
    TermStatus,
};
use rank_ripple::output::{ConsoleSink, SinkKind};
use rank_ripple::storage::{RankingStore, SqliteStorage};
use rank_ripple::{ExitStatus, FetchError, PageRange};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders one listing page in the directory's markup
fn listing_page(names: &[&str]) -> String {
    let items: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<div class="server"><span class="server-name">{}</span></div>"#,
                name
            )
        })
        .collect();

    format!(
        r#"<html><body>
        <div class="sidebar"><span class="server-name">Sponsored</span></div>
        <div class="col-md-8">{}</div>
        </body></html>"#,
        items
    )
}

async fn mount_page(server: &MockServer, route: &str, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(names))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Writes a config file into `dir` and loads it back
fn write_config(
    dir: &TempDir,
    base_url: &str,
    terms: &[&str],
    max_pages: &str,
    sink: SinkKind,
) -> (Config, String) {
    let terms: Vec<String> = terms.iter().map(|t| format!("\"{}\"", t)).collect();
    let database_path = dir.path().join("rankings.db");
    let results_dir = dir.path().join("results");

    let toml = format!(
        r#"
[pull]
search-terms = [{terms}]
max-pages = {max_pages}
query-type = "{sink}"
max-concurrent-fetches = 4

[directory]
label = "Listing"
base-url = "{base_url}/listing"
request-timeout-secs = 5
retries = 1
retry-delay-ms = 1

[user-agent]
crawler-name = "TestPuller"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "{database_path}"
results-dir = "{results_dir}"
"#,
        terms = terms.join(", "),
        max_pages = max_pages,
        sink = sink,
        base_url = base_url,
        database_path = database_path.display(),
        results_dir = results_dir.display(),
    );

    let config_path = dir.path().join("rank-ripple.toml");
    std::fs::write(&config_path, toml).expect("Failed to write config");
    load_config_with_hash(&config_path).expect("Failed to load config")
}

#[tokio::test]
async fn test_database_pull_end_to_end() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha", "Beta"]).await;
    mount_page(&server, "/listing/2/games", &["Gamma"]).await;
    mount_page(&server, "/listing/1", &["Front One"]).await;
    mount_page(&server, "/listing/2", &["Front Two"]).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, hash) = write_config(&dir, &server.uri(), &["games", ""], "2", SinkKind::Database);

    let report = run_pull(&config, &hash).await.expect("Pull failed");
    assert_eq!(report.pull.id, 1);
    assert!(report.committed);
    assert_eq!(report.exit_status(), ExitStatus::Success);
    assert_eq!(report.total_entries(), 5);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .expect("Failed to open DB");
    let rankings = storage.load_rankings(1).expect("Failed to load rankings");
    assert_eq!(rankings.len(), 2);

    let games = &rankings[0];
    assert_eq!(games.term(), "games");
    assert_eq!(games.pages(), PageRange::new(1, 2));
    assert_eq!(games.names().collect::<Vec<_>>(), vec!["Alpha", "Beta", "Gamma"]);
    let positions: Vec<u32> = games.entries().iter().map(|e| e.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);

    assert_eq!(rankings[1].term(), "");
    assert_eq!(
        rankings[1].names().collect::<Vec<_>>(),
        vec!["Front One", "Front Two"]
    );

    let latest = storage.latest_pull().unwrap().unwrap();
    assert_eq!(latest.config_hash, hash);
    assert_eq!(latest.term_count, 2);
}

#[tokio::test]
async fn test_console_pull_discovers_single_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha", "Beta"]).await;
    Mock::given(method("GET"))
        .and(path("/listing/2/games"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, _hash) =
        write_config(&dir, &server.uri(), &["games"], "\"all\"", SinkKind::Console);

    let fetcher = HttpPageFetcher::new(&config.directory, &config.user_agent)
        .expect("Failed to build fetcher");
    let collector = RankCollector::new(fetcher, 4);
    let sink = ConsoleSink::new(&config.directory.label, Vec::new());
    let mut orchestrator = PullOrchestrator::new(collector, sink);

    let context = PullContext::from_config(&config).unwrap();
    let report = orchestrator.run(&context).await.expect("Pull failed");
    assert_eq!(report.pull.id, 1);
    assert!(matches!(
        report.outcomes[0].status,
        TermStatus::Recorded {
            entries: 2,
            pages: PageRange { first: 1, last: 1 }
        }
    ));

    let out = String::from_utf8(orchestrator.into_sink().into_inner()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[1], "Listing rankings by term - games: ");
    assert_eq!(lines[2], "Pages 1-1");
    assert_eq!(&lines[3..], &["#   1: Alpha", "#   2: Beta"]);
}

#[tokio::test]
async fn test_consecutive_pulls_are_numbered() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha"]).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, hash) = write_config(&dir, &server.uri(), &["games"], "1", SinkKind::Database);

    let first = run_pull(&config, &hash).await.expect("First pull failed");
    let second = run_pull(&config, &hash).await.expect("Second pull failed");

    assert_eq!(first.pull.id, 1);
    assert_eq!(second.pull.id, 2);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.count_pulls().unwrap(), 2);
    assert_eq!(storage.max_pull_id().unwrap(), Some(2));
}

#[tokio::test]
async fn test_failing_term_is_isolated() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha"]).await;
    Mock::given(method("GET"))
        .and(path("/listing/1/broken"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2) // first attempt plus one retry
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, hash) =
        write_config(&dir, &server.uri(), &["broken", "games"], "1", SinkKind::Database);

    let report = run_pull(&config, &hash).await.expect("Pull failed");
    assert!(report.committed);
    assert_eq!(report.exit_status(), ExitStatus::PartialPull);
    assert!(matches!(
        report.outcomes[0].status,
        TermStatus::Failed(TermFailure::Fetch(FetchError::Status { status: 503, .. }))
    ));

    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    let rankings = storage.load_rankings(report.pull.id).unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].term(), "games");
}

#[tokio::test]
async fn test_timed_out_term_is_isolated() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha"]).await;
    Mock::given(method("GET"))
        .and(path("/listing/1/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(&["Late"]))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2) // first attempt plus one retry
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut config, hash) =
        write_config(&dir, &server.uri(), &["slow", "games"], "1", SinkKind::Database);
    config.directory.request_timeout_secs = 1;

    let report = run_pull(&config, &hash).await.expect("Pull failed");
    assert!(report.committed);
    assert_eq!(report.exit_status(), ExitStatus::PartialPull);
    assert!(matches!(
        report.outcomes[0].status,
        TermStatus::Failed(TermFailure::Fetch(FetchError::Timeout { .. }))
    ));
    assert!(report.outcomes[1].is_recorded());

    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    let rankings = storage.load_rankings(report.pull.id).unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].term(), "games");
    assert_eq!(rankings[0].names().collect::<Vec<_>>(), vec!["Alpha"]);
}

#[tokio::test]
async fn test_unbounded_file_pull() {
    let server = MockServer::start().await;
    mount_page(&server, "/listing/1/games", &["Alpha", "Beta"]).await;
    mount_page(&server, "/listing/2/games", &["Gamma"]).await;
    mount_page(&server, "/listing/3/games", &["Delta"]).await;
    // Every other page is answered with 404, past the end of the listing

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, hash) =
        write_config(&dir, &server.uri(), &["games"], "\"all\"", SinkKind::File);

    let report = run_pull(&config, &hash).await.expect("Pull failed");
    assert_eq!(report.exit_status(), ExitStatus::Success);
    assert!(matches!(
        report.outcomes[0].status,
        TermStatus::Recorded {
            entries: 4,
            pages: PageRange { first: 1, last: 3 }
        }
    ));

    let out = std::fs::read_to_string(dir.path().join("results").join("games.out"))
        .expect("Missing results file");
    assert!(out.contains("Listing rankings by term - games: "));
    assert!(out.contains("Pages 1-3"));
    assert!(out.contains("#   1: Alpha\n#   2: Beta\n#   3: Gamma\n#   4: Delta\n"));
    assert!(!out.contains("Sponsored"));
}

#[tokio::test]
async fn test_all_terms_failing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let (config, hash) = write_config(&dir, &server.uri(), &["a", "b"], "1", SinkKind::Database);

    let report = run_pull(&config, &hash).await.expect("Pull failed");
    assert!(!report.committed);
    assert_eq!(report.exit_status(), ExitStatus::FetchUnavailable);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path)).unwrap();
    assert_eq!(storage.count_pulls().unwrap(), 0);
}

#[tokio::test]
async fn test_unreachable_database() {
    let server = MockServer::start().await;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let (mut config, hash) =
        write_config(&dir, &server.uri(), &["games"], "1", SinkKind::Database);
    config.output.database_path = dir
        .path()
        .join("missing")
        .join("rankings.db")
        .display()
        .to_string();

    let err = run_pull(&config, &hash).await.expect_err("Pull should fail");
    assert_eq!(err.exit_status(), ExitStatus::SinkUnreachable);
}
