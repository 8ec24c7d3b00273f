//! 报告导出 - 业务能力层
//!
//! 只负责"把分数变成可下载的文档"，数据单向流入，不回写流水线状态。
//! - `ReportExporter`：渲染文档字节
//! - `ReportWriter`：把字节保存到输出目录（相当于浏览器端的下载）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::models::AnalysisScores;

/// 报告渲染能力
#[async_trait]
pub trait ReportExporter: Send + Sync {
    async fn export(
        &self,
        scores: &AnalysisScores,
        content_label: &str,
    ) -> Result<Vec<u8>, ExportError>;
}

/// 单页 A4 PDF 报告
pub struct PdfReportExporter {
    title: String,
}

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: i64 = 56;
const LABEL_LINE_CHARS: usize = 80;
const LABEL_MAX_LINES: usize = 6;

impl PdfReportExporter {
    pub fn new() -> Self {
        Self {
            title: "AEO Analysis Report".to_string(),
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// 同步渲染，便于在非异步上下文中使用
    pub fn render(
        &self,
        scores: &AnalysisScores,
        content_label: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, ExportError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut lines: Vec<(&str, i64, String)> = vec![
            ("F2", 22, self.title.clone()),
            (
                "F1",
                10,
                format!("Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
            ),
            ("F2", 12, "Analyzed content".to_string()),
        ];
        for line in wrap_label(content_label) {
            lines.push(("F1", 10, line));
        }
        lines.push((
            "F2",
            16,
            format!(
                "Final Score: {} / 100 ({})",
                scores.final_score(),
                scores.rating().label()
            ),
        ));
        for (label, value) in scores.sub_scores().entries() {
            lines.push(("F1", 12, format!("{}: {} / 100", label, value)));
        }

        let mut operations = vec![Operation::new("BT", vec![])];
        let mut y = PAGE_HEIGHT - 72;
        let mut first = true;
        for (font, size, text) in lines {
            if first {
                operations.push(Operation::new("Td", vec![MARGIN_LEFT.into(), y.into()]));
                first = false;
            } else {
                let step = size + 10;
                operations.push(Operation::new("Td", vec![0.into(), (-step).into()]));
                y -= step;
            }
            operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(pdf_safe(&text))],
            ));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|e| ExportError::RenderFailed {
            source: Box::new(e),
        })?;

        debug!("报告渲染完成: {} 字节", bytes.len());
        Ok(bytes)
    }
}

impl Default for PdfReportExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportExporter for PdfReportExporter {
    async fn export(
        &self,
        scores: &AnalysisScores,
        content_label: &str,
    ) -> Result<Vec<u8>, ExportError> {
        self.render(scores, content_label, Utc::now())
    }
}

/// 标准 Type1 字体按单字节编码，非 ASCII 字符替换为 `?`
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect()
}

/// 按字符数折行，最多保留若干行
fn wrap_label(label: &str) -> Vec<String> {
    let chars: Vec<char> = label.split_whitespace().collect::<Vec<_>>().join(" ").chars().collect();
    if chars.is_empty() {
        return vec!["(no label)".to_string()];
    }
    let mut lines: Vec<String> = chars
        .chunks(LABEL_LINE_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if lines.len() > LABEL_MAX_LINES {
        lines.truncate(LABEL_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            last.push_str("...");
        }
    }
    lines
}

/// 报告保存位置
pub struct ReportWriter {
    output_dir: PathBuf,
    file_name: String,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_name: file_name.into(),
        }
    }

    /// 同一目录下换一个文件名（批量导出时使用）
    pub fn with_file_name(&self, file_name: impl Into<String>) -> Self {
        Self {
            output_dir: self.output_dir.clone(),
            file_name: file_name.into(),
        }
    }

    pub fn target_path(&self) -> PathBuf {
        self.output_dir.join(&self.file_name)
    }

    /// 写入报告，已存在的同名文件会被覆盖
    pub async fn save(&self, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        let path = self.target_path();
        let write_failed = |path: &Path, source| ExportError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| write_failed(self.output_dir.as_path(), e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| write_failed(path.as_path(), e))?;

        info!("📄 报告已保存: {}", path.display());
        Ok(path)
    }
}
