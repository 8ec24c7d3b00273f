use aeo_analyzer::app::{AnalyzeOptions, App};
use aeo_analyzer::config::Config;
use aeo_analyzer::models::{ContentType, PromptDraft, PromptPatch};
use aeo_analyzer::utils::logging;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "aeo-analyzer")]
#[command(about = "AEO 内容分析：评分、建议与报告导出", long_about = None)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 强制使用占位评分后端
    #[arg(long, global = true)]
    stub: bool,

    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 分析单条内容
    Analyze {
        /// 要分析的 URL
        #[arg(long, conflicts_with_all = ["text", "file"])]
        url: Option<String>,
        /// 直接提交的文本
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// 从文件读取文本
        #[arg(long)]
        file: Option<PathBuf>,
        /// 内容类别（blog / product / article / landing-page / faq / news）
        #[arg(short = 't', long = "type", default_value = "blog", value_parser = parse_content_type)]
        content_type: ContentType,
        /// 同时显示详细分析
        #[arg(long)]
        detailed: bool,
        /// 导出 PDF 报告
        #[arg(long)]
        export: bool,
    },
    /// 批量分析 TOML 清单中的提交
    Batch {
        manifest: PathBuf,
        /// 为每条成功结果导出报告
        #[arg(long)]
        export: bool,
    },
    /// 启动评分服务
    Serve {
        /// 监听地址，默认取配置中的 server_bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// 管理保存的提示词
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },
}

#[derive(Subcommand)]
enum PromptsAction {
    /// 列出全部提示词
    List,
    /// 保存新提示词
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        original: String,
        #[arg(long)]
        optimized: String,
        #[arg(long)]
        score: Option<f64>,
    },
    /// 更新提示词
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        original: Option<String>,
        #[arg(long)]
        optimized: Option<String>,
        #[arg(long, conflicts_with = "clear_score")]
        score: Option<f64>,
        /// 清除分数
        #[arg(long)]
        clear_score: bool,
    },
    /// 删除提示词
    Delete { id: String },
}

fn parse_content_type(value: &str) -> Result<ContentType, String> {
    value.parse::<ContentType>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    if cli.stub {
        config.use_stub_backend = true;
    }
    if cli.verbose {
        config.verbose_logging = true;
    }

    // 初始化日志
    logging::init(config.verbose_logging);

    let app = App::initialize(config)?;

    match cli.command {
        Command::Analyze {
            url,
            text,
            file,
            content_type,
            detailed,
            export,
        } => {
            app.analyze(AnalyzeOptions {
                url,
                text,
                file,
                content_type,
                detailed,
                export,
            })
            .await?;
        }
        Command::Batch { manifest, export } => {
            let stats = app.batch(&manifest, export).await?;
            if stats.failed > 0 {
                tracing::warn!("⚠️ {} 条提交分析失败", stats.failed);
            }
        }
        Command::Serve { bind } => {
            app.serve(bind.as_deref()).await?;
        }
        Command::Prompts { action } => match action {
            PromptsAction::List => app.prompts_list(),
            PromptsAction::Save {
                name,
                original,
                optimized,
                score,
            } => app.prompts_save(PromptDraft {
                name,
                original_prompt: original,
                optimized_prompt: optimized,
                score,
            }),
            PromptsAction::Update {
                id,
                name,
                original,
                optimized,
                score,
                clear_score,
            } => {
                let score = if clear_score { Some(None) } else { score.map(Some) };
                app.prompts_update(
                    &id,
                    PromptPatch {
                        name,
                        original_prompt: original,
                        optimized_prompt: optimized,
                        score,
                    },
                )?;
            }
            PromptsAction::Delete { id } => app.prompts_delete(&id)?,
        },
    }

    Ok(())
}
