//! Document source: HTTP fetch with local persistence.

use std::path::Path;

use reqwest::Client;

use crate::error::RagError;

/// Fetch a plaintext document and persist it to `save_path` as a side
/// effect. The saved file is not read back by the pipeline. Any failure
/// here is fatal for the run.
pub async fn fetch_document(
    client: &Client,
    url: &str,
    save_path: &Path,
) -> Result<String, RagError> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    tokio::fs::write(save_path, &text).await?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_and_persist() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/essay.txt");
                then.status(200).body("What I Worked On");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("essay.txt");
        let client = Client::new();

        let text = fetch_document(&client, &server.url("/essay.txt"), &path)
            .await
            .unwrap();

        assert_eq!(text, "What I Worked On");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "What I Worked On");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_fatal() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.txt");
                then.status(404);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let client = Client::new();

        let result = fetch_document(&client, &server.url("/missing.txt"), &path).await;
        assert!(matches!(result, Err(RagError::Http(_))));
        assert!(!path.exists());
    }
}
