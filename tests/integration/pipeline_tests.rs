//! Integration tests for the scraping pipeline
//!
//! These tests use wiremock as the rendering proxy and run the phases
//! end-to-end against an on-disk SQLite database.

use jobtrawl::config::{Config, OutputConfig, PipelineConfig, ProxyConfig, SiteConfig};
use jobtrawl::crawler::{Coordinator, Phase, ProxyClient};
use jobtrawl::extract::NOT_AVAILABLE;
use jobtrawl::storage::{SqliteStorage, Storage};
use jobtrawl::{LastPage, ListingStage};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITE: &str = "https://site.test";

/// Creates a test configuration pointing at the mock proxy
fn create_test_config(proxy_uri: &str, dir: &Path, rescrape_existing: bool) -> Config {
    Config {
        pipeline: PipelineConfig {
            pool_size: 4,
            retry_limit: 2,
            fetch_timeout_secs: 5,
            backoff_unit_ms: 1, // Very short for testing
            max_backoff_secs: None,
            rescrape_existing,
        },
        site: SiteConfig {
            base_url: SITE.to_string(),
            location: "London".to_string(),
        },
        proxy: ProxyConfig {
            endpoint: proxy_uri.to_string(),
            api_key: "test-key".to_string(),
            country_code: None,
        },
        output: OutputConfig {
            database_path: dir.join("jobs.db").display().to_string(),
            spillover_path: dir.join("failed_last_pages.txt").display().to_string(),
            csv_dir: dir.join("csv").display().to_string(),
        },
    }
}

fn setup(server: &MockServer, dir: &TempDir, rescrape_existing: bool) -> (Arc<SqliteStorage>, Coordinator) {
    let config = create_test_config(&server.uri(), dir.path(), rescrape_existing);
    let storage = Arc::new(SqliteStorage::new(Path::new(&config.output.database_path)).unwrap());
    let client = ProxyClient::new(&config.proxy, Duration::from_secs(5)).unwrap();
    let coordinator = Coordinator::new(config, storage.clone(), client).unwrap();
    (storage, coordinator)
}

fn query_url(title: &str) -> String {
    format!("{}/jobs?q={}&l=London", SITE, title)
}

fn probe(title: &str) -> String {
    format!("{}&start=3000", query_url(title))
}

fn card(title: &str, href: Option<&str>) -> String {
    let title_html = match href {
        Some(href) => format!(r#"<h2><a class="jcs-JobTitle" href="{}">{}</a></h2>"#, href, title),
        None => format!("<h2>{}</h2>", title),
    };
    format!(
        r#"<li class="css-1ac2h1w">{}
             <span data-testid="company-name">Acme Health</span>
             <div data-testid="text-location">London</div>
             <span data-testid="myJobsStateDate">Posted 2 days ago</span>
           </li>"#,
        title_html
    )
}

fn results_page(cards: &[String]) -> String {
    format!("<html><body><ul>{}</ul></body></html>", cards.join(""))
}

fn pagination_page(current: u32) -> String {
    format!(
        r#"<html><body><nav><a data-testid="pagination-page-current">{}</a></nav></body></html>"#,
        current
    )
}

const NO_RESULTS_PAGE: &str = r#"<html><body>
    <div class="jobsearch-NoResult-messageContainer">No jobs found</div>
</body></html>"#;

const DETAIL_PAGE: &str = r#"<html><body>
    <div class="css-1unnuiz"><span>4.5</span></div>
    <div class="js-match-insights-provider-g6kqeb">
      <div class="js-match-insights-provider-tvvxwd">Permanent</div>
    </div>
    <div id="jobDescriptionText"><p>Care for patients.</p><p>Night shifts.</p></div>
    <button contenthtml="Apply now" href="https://apply.example.com/1">Apply now</button>
</body></html>"#;

const DETAIL_PAGE_WITHOUT_RATING: &str = r#"<html><body>
    <div id="jobDescriptionText"><p>Weld things.</p></div>
    <button id="indeedApplyButton"><span>Apply now</span></button>
</body></html>"#;

async fn mount_page(server: &MockServer, target: &str, body: &str) {
    Mock::given(method("GET"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", target))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    let nurse = storage.insert_search_query("nurse", &query_url("nurse")).unwrap();
    let astronaut = storage
        .insert_search_query("astronaut", &query_url("astronaut"))
        .unwrap();

    // Phase 1
    mount_page(&server, &probe("nurse"), &pagination_page(2)).await;
    mount_page(&server, &probe("astronaut"), NO_RESULTS_PAGE).await;

    // Phase 2
    mount_page(
        &server,
        &query_url("nurse"),
        &results_page(&[
            card("Staff Nurse", Some("/viewjob?jk=1")),
            card("Agency Nurse", None),
        ]),
    )
    .await;
    mount_page(
        &server,
        &format!("{}&start=10", query_url("nurse")),
        &results_page(&[card("Night Nurse", Some("/viewjob?jk=2"))]),
    )
    .await;

    // Phase 3
    mount_page(&server, &format!("{}/viewjob?jk=1", SITE), DETAIL_PAGE).await;
    mount_page(&server, &format!("{}/viewjob?jk=2", SITE), DETAIL_PAGE_WITHOUT_RATING).await;

    let reports = coordinator.run().await.unwrap();

    let phases: Vec<Phase> = reports.iter().map(|r| r.phase).collect();
    assert_eq!(phases, Phase::ALL);
    assert_eq!((reports[0].succeeded, reports[0].failed), (2, 0));
    assert_eq!((reports[1].succeeded, reports[1].failed), (1, 0));
    assert_eq!((reports[2].succeeded, reports[2].failed), (2, 0));

    let nurse_query = storage.get_search_query(nurse).unwrap();
    assert_eq!(nurse_query.last_page, Some(LastPage::Pages(2)));
    assert_eq!(
        nurse_query.pagination_links,
        Some(vec![
            query_url("nurse"),
            format!("{}&start=10", query_url("nurse"))
        ])
    );

    let astronaut_query = storage.get_search_query(astronaut).unwrap();
    assert_eq!(astronaut_query.last_page, Some(LastPage::NoResults));
    assert_eq!(astronaut_query.pagination_links, None);

    let listings = storage.list_listings().unwrap();
    assert_eq!(listings.len(), 3);
    assert!(listings.iter().all(|l| l.search_query_id == nurse));

    let staff = listings.iter().find(|l| l.title == "Staff Nurse").unwrap();
    assert_eq!(staff.page_number, 1);
    assert_eq!(staff.posted_date, "2 days ago");
    assert_eq!(staff.rating.as_deref(), Some("4.5"));
    assert_eq!(staff.employment_type.as_deref(), Some("Permanent"));
    assert_eq!(
        staff.description.as_deref(),
        Some("Care for patients.\nNight shifts.")
    );
    assert_eq!(staff.apply_link.as_deref(), Some("https://apply.example.com/1"));

    let night = listings.iter().find(|l| l.title == "Night Nurse").unwrap();
    assert_eq!(night.page_number, 2);
    assert_eq!(night.rating.as_deref(), Some(NOT_AVAILABLE));
    assert_eq!(night.apply_link.as_deref(), Some("Apply now"));
    assert_eq!(night.stage(), ListingStage::Enriched);

    // The card without a title link has neither a title nor a detail URL
    let unlinked = listings.iter().find(|l| l.detail_url == NOT_AVAILABLE).unwrap();
    assert_eq!(unlinked.title, NOT_AVAILABLE);
    assert_eq!(unlinked.company, "Acme Health");
    assert_eq!(unlinked.stage(), ListingStage::Summary);
    assert!(storage.listings_pending_details().unwrap().is_empty());
}

#[tokio::test]
async fn test_discovery_exhausts_retries_and_spills() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    let id = storage.insert_search_query("cook", &query_url("cook")).unwrap();

    // retry_limit 2 allows exactly three attempts
    Mock::given(method("GET"))
        .and(query_param("url", probe("cook").as_str()))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let report = coordinator.run_phase(Phase::LastPageDiscovery).await.unwrap();

    assert_eq!((report.succeeded, report.failed), (0, 1));
    assert!(!storage.get_search_query(id).unwrap().is_discovered());

    let spilled = std::fs::read_to_string(dir.path().join("failed_last_pages.txt")).unwrap();
    assert_eq!(spilled, format!("{}\n", probe("cook")));
}

#[tokio::test]
async fn test_failed_task_does_not_block_siblings() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    for title in ["chef", "porter", "barista", "sommelier"] {
        storage.insert_search_query(title, &query_url(title)).unwrap();
    }

    mount_page(&server, &probe("chef"), &pagination_page(3)).await;
    mount_page(&server, &probe("porter"), &pagination_page(1)).await;
    mount_page(&server, &probe("sommelier"), "<html><body></body></html>").await;
    Mock::given(method("GET"))
        .and(query_param("url", probe("barista").as_str()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = coordinator.run_phase(Phase::LastPageDiscovery).await.unwrap();
    assert_eq!((report.succeeded, report.failed), (3, 1));

    let pending = storage.queries_pending_discovery().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].title, "barista");

    let discovered: Vec<_> = storage
        .list_search_queries()
        .unwrap()
        .into_iter()
        .filter_map(|q| q.last_page.map(|p| (q.title, p)))
        .collect();
    assert!(discovered.contains(&("chef".to_string(), LastPage::Pages(3))));
    assert!(discovered.contains(&("porter".to_string(), LastPage::Pages(1))));
    assert!(discovered.contains(&("sommelier".to_string(), LastPage::Pages(1))));
}

#[tokio::test]
async fn test_failed_page_keeps_other_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    let id = storage.insert_search_query("porter", &query_url("porter")).unwrap();
    storage.record_last_page(id, LastPage::Pages(2)).unwrap();

    mount_page(
        &server,
        &query_url("porter"),
        &results_page(&[card("Night Porter", Some("/viewjob?jk=7"))]),
    )
    .await;
    Mock::given(method("GET"))
        .and(query_param("url", format!("{}&start=10", query_url("porter")).as_str()))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let report = coordinator.run_phase(Phase::ListingScraping).await.unwrap();

    assert_eq!((report.succeeded, report.failed), (0, 1));
    let listings = storage.list_listings().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].title, "Night Porter");
}

#[tokio::test]
async fn test_failed_page_is_retried_on_next_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    let id = storage.insert_search_query("porter", &query_url("porter")).unwrap();
    storage.record_last_page(id, LastPage::Pages(2)).unwrap();

    Mock::given(method("GET"))
        .and(query_param("url", query_url("porter").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[card("Night Porter", Some("/viewjob?jk=7"))])),
        )
        .expect(1)
        .mount(&server)
        .await;
    let second_page = format!("{}&start=10", query_url("porter"));
    Mock::given(method("GET"))
        .and(query_param("url", second_page.as_str()))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("url", second_page.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[card("Day Porter", Some("/viewjob?jk=8"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let first = coordinator.run_phase(Phase::ListingScraping).await.unwrap();
    assert_eq!((first.succeeded, first.failed), (0, 1));
    assert_eq!(storage.scraped_pages(id).unwrap(), vec![1]);

    let second = coordinator.run_phase(Phase::ListingScraping).await.unwrap();
    assert_eq!((second.succeeded, second.failed), (1, 0));

    let mut pages: Vec<_> = storage
        .list_listings()
        .unwrap()
        .into_iter()
        .map(|l| (l.page_number, l.title))
        .collect();
    pages.sort();
    assert_eq!(
        pages,
        vec![
            (1, "Night Porter".to_string()),
            (2, "Day Porter".to_string())
        ]
    );

    let third = coordinator.run_phase(Phase::ListingScraping).await.unwrap();
    assert_eq!(third.total(), 0);
}

#[tokio::test]
async fn test_scraped_queries_are_skipped_by_default() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, false);

    let id = storage.insert_search_query("welder", &query_url("welder")).unwrap();
    storage.record_last_page(id, LastPage::Pages(1)).unwrap();
    mount_page(
        &server,
        &query_url("welder"),
        &results_page(&[card("Welder", Some("/viewjob?jk=9"))]),
    )
    .await;

    coordinator.run_phase(Phase::ListingScraping).await.unwrap();
    let second = coordinator.run_phase(Phase::ListingScraping).await.unwrap();

    assert_eq!(second.total(), 0);
    assert_eq!(storage.list_listings().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rescrape_existing_inserts_again() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (storage, coordinator) = setup(&server, &dir, true);

    let id = storage.insert_search_query("welder", &query_url("welder")).unwrap();
    storage.record_last_page(id, LastPage::Pages(1)).unwrap();
    mount_page(
        &server,
        &query_url("welder"),
        &results_page(&[card("Welder", Some("/viewjob?jk=9"))]),
    )
    .await;

    coordinator.run_phase(Phase::ListingScraping).await.unwrap();
    let second = coordinator.run_phase(Phase::ListingScraping).await.unwrap();

    assert_eq!(second.succeeded, 1);
    assert_eq!(storage.list_listings().unwrap().len(), 2);
}

#[tokio::test]
async fn test_detail_phase_alone_with_nothing_pending() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (_storage, coordinator) = setup(&server, &dir, false);

    let report = coordinator.run_phase(Phase::DetailScraping).await.unwrap();

    assert_eq!(report.total(), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
