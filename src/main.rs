// ==========================================
// 商品目录批量导入系统 - 命令行入口
// ==========================================
// 技术栈: Rust + SQLite
// 用法:
//   catalog-import validate <文件路径> [--db <路径>] [--type FULL|STOCK_ONLY|PRICE_ONLY] [--mode UPSERT|UPDATE_ONLY|CREATE_ONLY] [--actor <操作人>]
//   catalog-import confirm <任务ID> [--db <路径>] [--actor <操作人>]
//   catalog-import history [--db <路径>] [--limit <条数>]
// ==========================================

use catalog_import::domain::types::{ImportMode, ImportType};
use catalog_import::{ImportApi, APP_NAME, VERSION};
use std::process::ExitCode;

const DEFAULT_DB_PATH: &str = "catalog_import.db";
const DEFAULT_ACTOR: &str = "cli";

#[tokio::main]
async fn main() -> ExitCode {
    catalog_import::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", APP_NAME);
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    match command.as_str() {
        "validate" => {
            let file_path = positional(args, 1, "文件路径")?;
            let db_path = flag_value(args, "--db").unwrap_or(DEFAULT_DB_PATH);
            let import_type: ImportType = flag_value(args, "--type")
                .unwrap_or("FULL")
                .parse()
                .map_err(anyhow::Error::msg)?;
            let mode: ImportMode = flag_value(args, "--mode")
                .unwrap_or("UPSERT")
                .parse()
                .map_err(anyhow::Error::msg)?;
            let actor = flag_value(args, "--actor").unwrap_or(DEFAULT_ACTOR);

            let bytes = std::fs::read(file_path)?;
            let file_name = std::path::Path::new(file_path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file_path.to_string());

            let api = ImportApi::new(db_path)?;
            let response = api
                .validate_import(&file_name, &bytes, import_type, mode, actor)
                .await?;

            println!("任务 ID: {}", response.job_id);
            println!(
                "汇总: 总行数={} 新建={} 更新={} 跳过={} 错误={}",
                response.summary.total,
                response.summary.to_create,
                response.summary.to_update,
                response.summary.skipped,
                response.summary.errors
            );
            for row in &response.preview {
                if row.validation_errors.is_empty() {
                    println!("  行{} {} → {}", row.row_number, row.sku, row.action);
                } else {
                    println!(
                        "  行{} {} → {} [{}]",
                        row.row_number,
                        row.sku,
                        row.action,
                        row.validation_errors.join("; ")
                    );
                }
            }
            println!("确认提交: catalog-import confirm {}", response.job_id);
        }
        "confirm" => {
            let job_id = positional(args, 1, "任务 ID")?;
            let db_path = flag_value(args, "--db").unwrap_or(DEFAULT_DB_PATH);
            let actor = flag_value(args, "--actor").unwrap_or(DEFAULT_ACTOR);

            let api = ImportApi::new(db_path)?;
            let response = api.confirm_import(job_id, actor).await?;

            println!(
                "提交{}: 成功={} 失败={}",
                if response.success { "完成" } else { "部分失败" },
                response.summary.success,
                response.summary.errors
            );
        }
        "history" => {
            let db_path = flag_value(args, "--db").unwrap_or(DEFAULT_DB_PATH);
            let limit: usize = flag_value(args, "--limit").unwrap_or("20").parse()?;

            let api = ImportApi::new(db_path)?;
            let jobs = api.list_import_jobs(limit).await?;

            if jobs.is_empty() {
                println!("暂无导入记录");
            }
            for job in jobs {
                println!(
                    "{}  {}  {}/{}  {}  总={} 成功={} 错误={}  by {}",
                    job.created_at.format("%Y-%m-%d %H:%M:%S"),
                    job.job_id,
                    job.import_type,
                    job.mode,
                    job.status,
                    job.total_rows,
                    job.success_rows,
                    job.error_rows,
                    job.created_by
                );
            }
        }
        other => {
            print_usage();
            anyhow::bail!("未知子命令: {}", other);
        }
    }

    Ok(())
}

/// 取第 idx 个位置参数（跳过 -- 开头的选项及其值）
fn positional<'a>(args: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    let mut positionals = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i].starts_with("--") {
            i += 2;
        } else {
            positionals.push(args[i].as_str());
            i += 1;
        }
    }
    positionals
        .get(idx)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("缺少参数: {}", name))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn print_usage() {
    println!("用法:");
    println!("  catalog-import validate <文件路径> [--db <路径>] [--type FULL|STOCK_ONLY|PRICE_ONLY] [--mode UPSERT|UPDATE_ONLY|CREATE_ONLY] [--actor <操作人>]");
    println!("  catalog-import confirm <任务ID> [--db <路径>] [--actor <操作人>]");
    println!("  catalog-import history [--db <路径>] [--limit <条数>]");
}
