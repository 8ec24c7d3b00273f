use crate::models::manifest::SubmissionManifest;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载批量提交清单
pub async fn load_manifest(manifest_path: &Path) -> Result<SubmissionManifest> {
    if !manifest_path.exists() {
        anyhow::bail!("清单文件不存在: {}", manifest_path.display());
    }

    let content = fs::read_to_string(manifest_path)
        .await
        .with_context(|| format!("无法读取清单文件: {}", manifest_path.display()))?;

    let mut manifest: SubmissionManifest = toml::from_str(&content)
        .with_context(|| format!("无法解析清单文件: {}", manifest_path.display()))?;

    manifest.file_path = Some(manifest_path.to_string_lossy().to_string());

    tracing::info!(
        "成功加载清单 {}，共 {} 条提交",
        manifest_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy(),
        manifest.submissions.len()
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_manifest_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[[submissions]]
url = "https://example.com/blog/aeo"
label = "company blog"

[[submissions]]
text = "Answer engine optimization helps content appear in AI answers."
content_type = "article"
"#
        )
        .unwrap();

        let manifest = load_manifest(file.path()).await.unwrap();
        assert_eq!(manifest.submissions.len(), 2);
        assert_eq!(manifest.submissions[0].content_type, "blog");
        assert_eq!(manifest.submissions[0].label.as_deref(), Some("company blog"));
        assert_eq!(manifest.submissions[1].content_type, "article");
        assert!(manifest.file_path.is_some());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_error() {
        let result = load_manifest(Path::new("/definitely/not/here.toml")).await;
        assert!(result.is_err());
    }
}
