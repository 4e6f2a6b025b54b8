use sitemap_crawler::config::Config;
use sitemap_crawler::{crawl, CrawlReport, UrlStatus};
use std::collections::HashSet;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A configuration fast enough for tests
pub fn create_test_config() -> Config {
    Config {
        requests_per_second: 200.0,
        max_concurrent_requests: 4,
        retry_backoff_ms: 10,
        request_timeout_secs: 5,
        robots_timeout_secs: 2,
        ..Config::default()
    }
}

/// Mounts an HTML page whose body links to `links`
pub async fn mount_page(server: &MockServer, page: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(format!(
                    "<html><head><title>{}</title></head><body>{}</body></html>",
                    page, anchors
                )),
        )
        .mount(server)
        .await;
}

/// Mounts a path that must never be requested
async fn mount_forbidden(server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

pub fn seed_of(server: &MockServer) -> Url {
    Url::parse(&server.uri()).unwrap()
}

pub fn included_paths(report: &CrawlReport) -> HashSet<String> {
    report
        .entries
        .iter()
        .map(|entry| {
            let url = entry.loc.as_url();
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        })
        .collect()
}

fn set(paths: &[&str]) -> HashSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn test_excluded_pattern_never_crawled() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &["/admin"]).await;
    mount_page(&server, "/b", &[]).await;
    mount_forbidden(&server, "/admin").await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/a", "/b"]));
    assert_eq!(report.entries[0].loc, report.seed);
    assert_eq!(report.stats.count(UrlStatus::Included), 3);
}

#[tokio::test]
async fn test_max_depth_zero_only_seed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_forbidden(&server, "/a").await;
    mount_forbidden(&server, "/b").await;

    let config = Config {
        max_depth: 0,
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/"]));
}

#[tokio::test]
async fn test_depth_limit_respected() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/l1"]).await;
    mount_page(&server, "/l1", &["/l2"]).await;
    mount_page(&server, "/l2", &["/l3"]).await;
    mount_forbidden(&server, "/l3").await;

    let config = Config {
        max_depth: 2,
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/l1", "/l2"]));
    assert!(report.entries.iter().all(|entry| entry.depth <= 2));
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/private/data", "/public"]).await;
    mount_page(&server, "/public", &[]).await;
    mount_forbidden(&server, "/private/data").await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/public"]));
    assert_eq!(report.stats.count(UrlStatus::Excluded), 1);
}

#[tokio::test]
async fn test_broken_robots_does_not_stop_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/a"]).await;
    mount_page(&server, "/a", &[]).await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/", "/a"]));
}

#[tokio::test]
async fn test_absurd_crawl_delay_does_not_abort_crawl() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 1e20"))
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/a"]).await;

    let config = Config {
        max_depth: 0,
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/"]));
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r##"<a href="/shared">1</a><a href="/shared#x">2</a><a href="/a">a</a><a href="/b">b</a>"##,
                ),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", &["/shared", "/", "/b"]).await;
    mount_page(&server, "/b", &["/shared", "/a"]).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/a", "/b", "/shared"]));
    let unique: HashSet<_> = report.entries.iter().map(|e| e.loc.clone()).collect();
    assert_eq!(unique.len(), report.entries.len());
}

#[tokio::test]
async fn test_canonical_links_collapse_duplicates() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/shoes?color=red", "/shoes?color=blue"]).await;
    for variant in ["red", "blue"] {
        Mock::given(method("GET"))
            .and(path("/shoes"))
            .and(wiremock::matchers::query_param("color", variant))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(r#"<html><head><link rel="canonical" href="/shoes"></head></html>"#),
            )
            .mount(&server)
            .await;
    }

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/shoes"]));
    assert_eq!(report.entries.len(), 2);
}

#[tokio::test]
async fn test_disallowed_canonical_target_not_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"))
        .mount(&server)
        .await;
    mount_page(&server, "/", &["/variant"]).await;
    Mock::given(method("GET"))
        .and(path("/variant"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(r#"<html><head><link rel="canonical" href="/private/page"></head></html>"#),
        )
        .mount(&server)
        .await;
    mount_forbidden(&server, "/private/page").await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/", "/variant"]));
}

#[tokio::test]
async fn test_non_html_included_but_not_parsed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/report.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_string(r#"<a href="/hidden">not a link</a>"#),
        )
        .mount(&server)
        .await;
    mount_forbidden(&server, "/hidden").await;

    let config = Config {
        valid_extensions: vec![],
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/report.pdf"]));
}

#[tokio::test]
async fn test_disallowed_extensions_skipped() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/photo.jpg", "/page.html"]).await;
    mount_page(&server, "/page.html", &[]).await;
    mount_forbidden(&server, "/photo.jpg").await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/", "/page.html"]));
}

#[tokio::test]
async fn test_failed_pages_left_out() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/gone", "/ok"]).await;
    mount_page(&server, "/ok", &[]).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    assert_eq!(included_paths(&report), set(&["/", "/ok"]));
    assert_eq!(report.stats.count(UrlStatus::Failed), 1);
}

#[tokio::test]
async fn test_transient_errors_retried() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/flaky"]).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", &[]).await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/", "/flaky"]));
}

#[tokio::test]
async fn test_off_site_links_not_followed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &["https://other.invalid/page", "mailto:me@example.com", "/local"],
    )
    .await;
    mount_page(&server, "/local", &[]).await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(included_paths(&report), set(&["/", "/local"]));
}

#[tokio::test]
async fn test_last_modified_header_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .insert_header("last-modified", "Fri, 01 Mar 2024 08:00:00 GMT")
                .set_body_string("<html></html>"),
        )
        .mount(&server)
        .await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert_eq!(
        report.entries[0].lastmod,
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
    );
}

#[tokio::test]
async fn test_single_worker_crawl_is_breadth_first() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &["/a/deep"]).await;
    mount_page(&server, "/b", &[]).await;
    mount_page(&server, "/a/deep", &[]).await;

    let config = Config {
        max_concurrent_requests: 1,
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();

    let order: Vec<&str> = report.entries.iter().map(|e| e.loc.as_url().path()).collect();
    assert_eq!(order, vec!["/", "/a", "/b", "/a/deep"]);
}
