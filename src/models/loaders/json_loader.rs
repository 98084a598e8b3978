use crate::error::InputError;
use crate::models::record::RawDocument;
use std::path::Path;
use tokio::fs;

/// 从 JSON 文件加载导出文档
///
/// 文件不存在、读取失败或 JSON 不合法都是整个批次的致命错误
pub async fn load_document(json_file_path: &Path) -> Result<RawDocument, InputError> {
    let path_str = json_file_path.display().to_string();

    if !json_file_path.exists() {
        return Err(InputError::NotFound { path: path_str });
    }

    let content = fs::read_to_string(json_file_path)
        .await
        .map_err(|source| InputError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| InputError::JsonParseFailed {
            path: path_str,
            source,
        })?;

    let document = RawDocument::from_value(value)?;
    tracing::debug!(
        "成功加载 {} 个工单: {}",
        document.len(),
        json_file_path.display()
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        std::fs::write(&path, r#"{"content": [{"id": 1, "jobs": []}]}"#).unwrap();

        let doc = load_document(&path).await.unwrap();
        assert_eq!(doc.len(), 1);
    }

    #[tokio::test]
    async fn test_load_document_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_document(&missing).await,
            Err(InputError::NotFound { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            load_document(&broken).await,
            Err(InputError::JsonParseFailed { .. })
        ));
    }
}
