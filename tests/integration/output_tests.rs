use crate::crawl_tests::{create_test_config, included_paths, mount_page, seed_of};
use flate2::read::GzDecoder;
use sitemap_crawler::config::Config;
use sitemap_crawler::output::parse_sitemap_locs;
use sitemap_crawler::{crawl, write_sitemaps};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

fn read_gz(path: &Path) -> Vec<u8> {
    let mut decoded = Vec::new();
    GzDecoder::new(fs::File::open(path).unwrap())
        .read_to_end(&mut decoded)
        .unwrap();
    decoded
}

fn assert_gz_matches(dir: &Path, name: &str) {
    let xml = fs::read(dir.join(name)).unwrap();
    let gz = read_gz(&dir.join(format!("{}.gz", name)));
    assert_eq!(xml, gz, "{}.gz differs from {}", name, name);
}

#[tokio::test]
async fn test_single_sitemap_output() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &[]).await;
    mount_page(&server, "/b", &[]).await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    let temp_dir = TempDir::new().unwrap();
    let written = write_sitemaps(&report, temp_dir.path()).unwrap();

    assert_eq!(written.len(), 3);
    assert!(report.index.is_none());
    assert!(!temp_dir.path().join("sitemap-1.xml").exists());
    assert!(temp_dir.path().join("sitemap.html").exists());
    assert_gz_matches(temp_dir.path(), "sitemap.xml");

    let xml = fs::read_to_string(temp_dir.path().join("sitemap.xml")).unwrap();
    assert!(xml.contains("<urlset"));
    let locs: HashSet<String> = parse_sitemap_locs(&xml).unwrap().into_iter().collect();
    let expected: HashSet<String> = report.entries.iter().map(|e| e.loc.to_string()).collect();
    assert_eq!(locs, expected);
    assert_eq!(locs.len(), 3);
}

#[tokio::test]
async fn test_multi_file_output_with_index() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/p1", "/p2", "/p3", "/p4"]).await;
    for page in ["/p1", "/p2", "/p3", "/p4"] {
        mount_page(&server, page, &[]).await;
    }

    let config = Config {
        max_urls_per_sitemap: 2,
        ..create_test_config()
    };
    let report = crawl(&seed_of(&server), &config).await.unwrap();
    assert_eq!(report.entries.len(), 5);
    assert_eq!(report.files.len(), 3);

    let temp_dir = TempDir::new().unwrap();
    write_sitemaps(&report, temp_dir.path()).unwrap();

    let index_xml = fs::read_to_string(temp_dir.path().join("sitemap.xml")).unwrap();
    assert!(index_xml.contains("<sitemapindex"));
    let referenced = parse_sitemap_locs(&index_xml).unwrap();
    let base = format!("{}/", server.uri());
    assert_eq!(
        referenced,
        vec![
            format!("{}sitemap-1.xml", base),
            format!("{}sitemap-2.xml", base),
            format!("{}sitemap-3.xml", base),
        ]
    );
    assert_gz_matches(temp_dir.path(), "sitemap.xml");

    let mut all_locs = HashSet::new();
    let mut total = 0;
    for n in 1..=3 {
        let name = format!("sitemap-{}.xml", n);
        assert_gz_matches(temp_dir.path(), &name);
        let xml = fs::read_to_string(temp_dir.path().join(&name)).unwrap();
        let locs = parse_sitemap_locs(&xml).unwrap();
        assert!(locs.len() <= 2);
        total += locs.len();
        all_locs.extend(locs);
    }
    assert_eq!(total, 5);

    let expected: HashSet<String> = report.entries.iter().map(|e| e.loc.to_string()).collect();
    assert_eq!(all_locs, expected);
    let expected_paths: HashSet<String> = ["/", "/p1", "/p2", "/p3", "/p4"]
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(included_paths(&report), expected_paths);

    let html = fs::read_to_string(temp_dir.path().join("sitemap.html")).unwrap();
    for loc in &expected {
        assert!(html.contains(loc.as_str()));
    }
}

#[tokio::test]
async fn test_empty_crawl_writes_empty_sitemap() {
    let server = MockServer::start().await;

    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();
    assert!(report.entries.is_empty());

    let temp_dir = TempDir::new().unwrap();
    write_sitemaps(&report, temp_dir.path()).unwrap();

    let xml = fs::read_to_string(temp_dir.path().join("sitemap.xml")).unwrap();
    assert!(xml.contains("urlset"));
    assert!(parse_sitemap_locs(&xml).unwrap().is_empty());
    assert_gz_matches(temp_dir.path(), "sitemap.xml");
}

#[tokio::test]
async fn test_write_failure_is_an_error() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &[]).await;
    let report = crawl(&seed_of(&server), &create_test_config()).await.unwrap();

    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();

    assert!(write_sitemaps(&report, &blocker).is_err());
}
