use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use doc_issue_engine::io::{mime_for_path, PlainTextExtractor, TextExtractor};
use doc_issue_engine::utils::preview_text;
use doc_issue_engine::{
    ApplyOutcome, DocumentEditor, EngineConfig, ExportFormat, Issue, ISSUES_FILE_EXTENSION,
};

#[derive(Parser)]
#[command(name = "doc_issue_engine")]
#[command(about = "把审阅问题应用到文档纯文本上，并导出修订稿")]
#[command(version)]
struct Cli {
    /// 输入文档路径（纯文本 / Markdown / HTML）
    #[arg(short, long)]
    input: PathBuf,

    /// 问题列表 JSON 文件路径
    #[arg(long)]
    issues: PathBuf,

    /// 文档 MIME 类型（默认按扩展名推断，可带 charset 参数）
    #[arg(long)]
    mime: Option<String>,

    /// 配置文件路径（JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 应用所有待处理问题
    #[arg(long)]
    apply_all: bool,

    /// 应用指定问题（可重复）
    #[arg(long = "apply", value_name = "ID")]
    apply_ids: Vec<String>,

    /// 拒绝指定问题（可重复）
    #[arg(long = "reject", value_name = "ID")]
    reject_ids: Vec<String>,

    /// 输出修订后的纯文本路径
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输出 JSON 报告路径
    #[arg(long)]
    report: Option<PathBuf>,

    /// 打印当前高亮区间
    #[arg(long)]
    decorations: bool,

    /// 导出修订稿到指定目录
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// 导出格式（html / json），默认取配置
    #[arg(long)]
    format: Option<ExportFormat>,

    /// 导出时只包含已应用的变更
    #[arg(long)]
    final_only: bool,

    /// 显示编辑统计信息
    #[arg(long)]
    stats: bool,

    /// 静默模式(仅输出错误)
    #[arg(long)]
    quiet: bool,

    /// 输出调试日志
    #[arg(long)]
    verbose: bool,
}

/// JSON 报告
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    document: &'a str,
    revision: u64,
    content: &'a str,
    outcomes: &'a [ApplyOutcome],
    issues: Vec<Issue>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(&cli);
    validate_input(&cli)?;

    let config = EngineConfig::load_or_default(cli.config.as_deref())
        .with_context(|| format!("加载配置失败: {:?}", cli.config))?;

    let content = read_document(&cli)?;
    let issues = load_issues(&cli.issues)?;

    if !cli.quiet {
        println!("已读取文档 {:?}（{} 字符），问题 {} 个", cli.input, content.chars().count(), issues.len());
    }

    let mut editor = DocumentEditor::with_config(document_name(&cli.input), content, issues, config);

    for id in &cli.reject_ids {
        editor
            .reject_issue(id)
            .with_context(|| format!("拒绝问题失败: {}", id))?;
    }

    let outcomes = run_apply_actions(&cli, &mut editor)?;

    if !cli.quiet {
        for outcome in &outcomes {
            print_outcome(outcome, &editor);
        }
    }

    if cli.decorations {
        print_decorations(&editor)?;
    }

    if cli.stats {
        println!("{}", editor.get_stats());
    }

    if editor.is_modified() {
        let output_path = get_output_path(&cli);
        std::fs::write(&output_path, editor.content())
            .with_context(|| format!("写入修订文本失败: {:?}", output_path))?;
        if !cli.quiet {
            println!("修订文本已写入: {:?}", output_path);
        }
    }

    if let Some(dir) = &cli.export {
        export_artifact(&cli, &editor, dir)?;
    }

    if let Some(report_path) = &cli.report {
        save_report(&editor, &outcomes, report_path)?;
    }

    Ok(())
}

/// 初始化日志（输出到 stderr）
fn init_logger(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}

/// 验证输入文件
fn validate_input(cli: &Cli) -> Result<()> {
    if !cli.input.exists() {
        bail!("输入文件不存在: {:?}", cli.input);
    }

    if !cli.issues.exists() {
        bail!("问题文件不存在: {:?}", cli.issues);
    }

    let extension = cli
        .issues
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if extension.as_deref() != Some(ISSUES_FILE_EXTENSION) {
        bail!("问题文件必须是 JSON 文件");
    }

    if cli.apply_all && !cli.apply_ids.is_empty() {
        bail!("--apply-all 与 --apply 只能使用一种");
    }

    Ok(())
}

/// 读取文档并提取纯文本
fn read_document(cli: &Cli) -> Result<String> {
    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("读取输入文件失败: {:?}", cli.input))?;

    let mime = cli
        .mime
        .clone()
        .unwrap_or_else(|| mime_for_path(&cli.input).to_string());

    PlainTextExtractor
        .extract_plain_text(&bytes, &mime)
        .with_context(|| format!("提取文本失败: {:?} ({})", cli.input, mime))
}

/// 加载问题列表
fn load_issues(path: &Path) -> Result<Vec<Issue>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("读取问题文件失败: {:?}", path))?;

    let issues: Vec<Issue> =
        serde_json::from_str(&raw).with_context(|| format!("解析问题文件失败: {:?}", path))?;

    if issues.is_empty() {
        log::warn!("问题列表为空: {:?}", path);
    }

    Ok(issues)
}

/// 执行应用操作
fn run_apply_actions(cli: &Cli, editor: &mut DocumentEditor) -> Result<Vec<ApplyOutcome>> {
    let mut outcomes = Vec::new();

    for id in &cli.apply_ids {
        let outcome = editor
            .apply_issue(id)
            .with_context(|| format!("应用问题失败: {}", id))?;
        outcomes.push(outcome);
    }

    if cli.apply_all {
        outcomes.push(editor.apply_all().context("批量应用失败")?);
    }

    Ok(outcomes)
}

/// 打印应用结果，跳过的问题逐个列出
fn print_outcome(outcome: &ApplyOutcome, editor: &DocumentEditor) {
    println!("{}", outcome.summary());

    for change in &outcome.applied {
        println!("  ✓ {}", change);
    }

    for id in &outcome.conflicts {
        let with = outcome.conflicting_with.get(id).map(String::as_str).unwrap_or("?");
        println!("  ⚠ [{}] 与 [{}] 区间重叠，已跳过", id, with);
    }

    for id in &outcome.not_found {
        let original = editor
            .issue(id)
            .map(|issue| preview_text(&issue.original_text, 40))
            .unwrap_or_default();
        println!("  ⚠ [{}] 原文未找到，已跳过: \"{}\"", id, original);
    }
}

/// 打印高亮区间
fn print_decorations(editor: &DocumentEditor) -> Result<()> {
    let decorations = editor.decorations();
    let json = serde_json::to_string_pretty(&decorations.iter_sorted())
        .context("序列化高亮失败")?;
    println!("{}", json);
    Ok(())
}

/// 导出修订稿
fn export_artifact(cli: &Cli, editor: &DocumentEditor, dir: &Path) -> Result<()> {
    let format = cli.format.unwrap_or(editor.config().export_format);
    let preview = editor.config().include_pending_in_export && !cli.final_only;

    let artifact = editor.export(format, preview).context("生成修订稿失败")?;

    std::fs::create_dir_all(dir).with_context(|| format!("创建导出目录失败: {:?}", dir))?;
    let path = dir.join(&artifact.filename);
    std::fs::write(&path, &artifact.bytes).with_context(|| format!("写入修订稿失败: {:?}", path))?;

    if !cli.quiet {
        println!("修订稿已导出: {:?} ({} 字节)", path, artifact.bytes.len());
    }

    Ok(())
}

/// 保存 JSON 报告
fn save_report(editor: &DocumentEditor, outcomes: &[ApplyOutcome], path: &Path) -> Result<()> {
    let report = Report {
        document: editor.name(),
        revision: editor.revision(),
        content: editor.content(),
        outcomes,
        issues: editor.issues(),
    };

    let json = serde_json::to_string_pretty(&report).context("序列化报告失败")?;
    std::fs::write(path, json).with_context(|| format!("写入报告失败: {:?}", path))
}

/// 文档名称（文件名主干）
fn document_name(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document")
        .to_string()
}

/// 获取修订文本输出路径
fn get_output_path(cli: &Cli) -> PathBuf {
    cli.output.clone().unwrap_or_else(|| {
        let mut output = cli.input.clone();
        let stem = document_name(&cli.input);
        match cli.input.extension().and_then(|ext| ext.to_str()) {
            Some(extension) => output.set_file_name(format!("{}_revised.{}", stem, extension)),
            None => output.set_file_name(format!("{}_revised", stem)),
        }
        output
    })
}
