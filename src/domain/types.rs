// ==========================================
// 商品目录导入系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 导入类型 (Import Type)
// ==========================================
// 决定每行期望的字段集合，以及是否允许新建商品
// （部分字段导入 STOCK_ONLY / PRICE_ONLY 不允许新建）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportType {
    Full,      // 全量商品导入
    StockOnly, // 仅库存
    PriceOnly, // 仅价格
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportType::Full => write!(f, "FULL"),
            ImportType::StockOnly => write!(f, "STOCK_ONLY"),
            ImportType::PriceOnly => write!(f, "PRICE_ONLY"),
        }
    }
}

impl FromStr for ImportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FULL" => Ok(ImportType::Full),
            "STOCK_ONLY" => Ok(ImportType::StockOnly),
            "PRICE_ONLY" => Ok(ImportType::PriceOnly),
            other => Err(format!("未知导入类型: {}", other)),
        }
    }
}

// ==========================================
// 导入模式 (Import Mode)
// ==========================================
// 决定已存在/不存在的商品是否可被更新/新建/跳过
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportMode {
    Upsert,     // 存在则更新，不存在则新建
    UpdateOnly, // 仅更新，不存在则跳过
    CreateOnly, // 仅新建，已存在则跳过
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Upsert => write!(f, "UPSERT"),
            ImportMode::UpdateOnly => write!(f, "UPDATE_ONLY"),
            ImportMode::CreateOnly => write!(f, "CREATE_ONLY"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPSERT" => Ok(ImportMode::Upsert),
            "UPDATE_ONLY" => Ok(ImportMode::UpdateOnly),
            "CREATE_ONLY" => Ok(ImportMode::CreateOnly),
            other => Err(format!("未知导入模式: {}", other)),
        }
    }
}

// ==========================================
// 任务状态 (Job Status)
// ==========================================
// 状态机: VALIDATED → PROCESSING → {COMPLETED, FAILED}
// 终态不可再变更；VALIDATED 是唯一允许发起提交的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Validated,  // 校验完成，等待人工确认
    Processing, // 提交执行中
    Completed,  // 提交完成，无行级失败
    Failed,     // 提交完成，存在行级失败（非管道崩溃）
}

impl JobStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Validated => write!(f, "VALIDATED"),
            JobStatus::Processing => write!(f, "PROCESSING"),
            JobStatus::Completed => write!(f, "COMPLETED"),
            JobStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VALIDATED" => Ok(JobStatus::Validated),
            "PROCESSING" => Ok(JobStatus::Processing),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("未知任务状态: {}", other)),
        }
    }
}

// ==========================================
// 行动作 (Row Action)
// ==========================================
// 校验阶段为每行判定的动作，提交阶段只回放 CREATE/UPDATE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowAction {
    Create, // 新建商品
    Update, // 按差异补丁更新
    Skip,   // 模式不允许，跳过（无副作用）
    Error,  // 校验失败或目标不存在
}

impl RowAction {
    /// 提交阶段是否需要回放此行
    pub fn is_actionable(&self) -> bool {
        matches!(self, RowAction::Create | RowAction::Update)
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowAction::Create => write!(f, "CREATE"),
            RowAction::Update => write!(f, "UPDATE"),
            RowAction::Skip => write!(f, "SKIP"),
            RowAction::Error => write!(f, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_type_roundtrip() {
        for t in [ImportType::Full, ImportType::StockOnly, ImportType::PriceOnly] {
            assert_eq!(t.to_string().parse::<ImportType>().unwrap(), t);
        }
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Validated.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_row_action_actionable() {
        assert!(RowAction::Create.is_actionable());
        assert!(RowAction::Update.is_actionable());
        assert!(!RowAction::Skip.is_actionable());
        assert!(!RowAction::Error.is_actionable());
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("CANCELLED".parse::<JobStatus>().is_err());
    }
}
