//! End-to-end deploys against mocked OVH API and Swift storage.

use httpmock::prelude::*;
use httpmock::MockServer;
use tempfile::TempDir;

use ovhdeploy_common::{Error, UploadFailure};
use ovhdeploy_deploy::{ConfigFile, DeployConfig, DeployPlugin};

fn dist() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("app.js"), "console.log('app');").unwrap();
    std::fs::write(temp.path().join("app.css"), "body {}").unwrap();
    std::fs::write(temp.path().join("manifest.txt"), "app.js\napp.css\n").unwrap();
    temp
}

fn mock_account_api(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/auth/time");
        then.status(200).body(unix_now().to_string());
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/cloud/project/my-service/storage/access")
            .header("x-ovh-application", "appKey");
        then.status(200).json_body(serde_json::json!({
            "token": "swift-token",
            "endpoints": [
                {"region": "SBG1", "url": server.url("/v1/AUTH_other")},
                {"region": "GRA1", "url": server.url("/v1/AUTH_p")}
            ]
        }));
    });
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn config(
    server: &MockServer,
    temp: &TempDir,
    dist_files: Option<&[&str]>,
    manifest: Option<&str>,
) -> DeployConfig {
    let file = ConfigFile {
        endpoint: Some(server.base_url()),
        app_key: Some("appKey".to_string()),
        app_secret: Some("secreeeet".to_string().into()),
        consumer_key: Some("dakey".to_string().into()),
        service_name: Some("my-service".to_string()),
        container: Some("my-container".to_string()),
        region: Some("GRA1".to_string()),
        dist_dir: Some(temp.path().to_path_buf()),
        dist_files: dist_files.map(|files| files.to_vec().into()),
        manifest_path: manifest.map(String::from),
        ..ConfigFile::default()
    };
    DeployConfig::resolve(file).unwrap()
}

#[tokio::test]
async fn test_full_deploy_without_manifest() {
    let server = MockServer::start_async().await;
    let temp = dist();
    mock_account_api(&server);

    let mut puts = Vec::new();
    for file in ["app.css", "app.js", "manifest.txt"] {
        puts.push(server.mock(|when, then| {
            when.method(PUT)
                .path(format!("/v1/AUTH_p/my-container/{}", file))
                .header("x-auth-token", "swift-token");
            then.status(201);
        }));
    }

    let plugin = DeployPlugin::from_config(config(&server, &temp, None, None)).unwrap();
    let report = plugin.upload().await.unwrap();

    assert_eq!(report.files_uploaded, vec!["app.css", "app.js", "manifest.txt"]);
    for put in puts {
        put.assert();
    }
}

#[tokio::test]
async fn test_differential_deploy_skips_manifest_entries() {
    let server = MockServer::start_async().await;
    let temp = dist();
    mock_account_api(&server);

    let manifest_get = server.mock(|when, then| {
        when.method(GET)
            .path("/v1/AUTH_p/my-container/manifest.txt")
            .header("x-auth-token", "swift-token");
        then.status(200).body("app.css\n");
    });
    let js_put = server.mock(|when, then| {
        when.method(PUT)
            .path("/v1/AUTH_p/my-container/app.js")
            .body("console.log('app');");
        then.status(201);
    });
    let manifest_put = server.mock(|when, then| {
        when.method(PUT).path("/v1/AUTH_p/my-container/manifest.txt");
        then.status(201);
    });

    let config = config(
        &server,
        &temp,
        Some(&["app.js", "app.css"][..]),
        Some("manifest.txt"),
    );
    let plugin = DeployPlugin::from_config(config).unwrap();
    let report = plugin.upload().await.unwrap();

    manifest_get.assert();
    js_put.assert();
    manifest_put.assert();
    assert_eq!(report.files_uploaded, vec!["app.js", "manifest.txt"]);
}

#[tokio::test]
async fn test_failed_put_fails_deploy() {
    let server = MockServer::start_async().await;
    let temp = dist();
    mock_account_api(&server);

    server.mock(|when, then| {
        when.method(PUT).path("/v1/AUTH_p/my-container/app.css");
        then.status(201);
    });
    server.mock(|when, then| {
        when.method(PUT).path("/v1/AUTH_p/my-container/app.js");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(PUT).path("/v1/AUTH_p/my-container/manifest.txt");
        then.status(201);
    });

    let plugin = DeployPlugin::from_config(config(&server, &temp, None, None)).unwrap();
    let result = plugin.upload().await;

    assert!(matches!(
        result,
        Err(Error::Upload { path, cause: UploadFailure::Status(500) }) if path == "app.js"
    ));
}

#[tokio::test]
async fn test_plan_with_unavailable_manifest() {
    let server = MockServer::start_async().await;
    let temp = dist();
    mock_account_api(&server);

    server.mock(|when, then| {
        when.method(GET).path("/v1/AUTH_p/my-container/manifest.txt");
        then.status(404);
    });

    let config = config(
        &server,
        &temp,
        Some(&["app.js", "app.css"][..]),
        Some("manifest.txt"),
    );
    let plugin = DeployPlugin::from_config(config).unwrap();
    let (endpoint, plan) = plugin.plan().await.unwrap();

    assert_eq!(endpoint.access_token, "swift-token");
    assert_eq!(endpoint.base_url, server.url("/v1/AUTH_p"));
    assert_eq!(plan.files(), &["app.js", "app.css", "manifest.txt"]);
}

#[tokio::test]
async fn test_access_denied() {
    let server = MockServer::start_async().await;
    let temp = dist();

    server.mock(|when, then| {
        when.method(GET).path("/auth/time");
        then.status(200).body(unix_now().to_string());
    });
    server.mock(|when, then| {
        when.method(POST).path("/cloud/project/my-service/storage/access");
        then.status(403);
    });

    let plugin = DeployPlugin::from_config(config(&server, &temp, None, None)).unwrap();
    let result = plugin.upload().await;

    assert!(matches!(result, Err(Error::AccessDenied(403))));
}
