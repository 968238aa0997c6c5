//! POS Server - 点单核心服务
//!
//! # 架构概述
//!
//! 扫码点单 / 外卖 / 自取订单的事务与状态核心：
//!
//! - **下单** (`orders`): 购物车校验、定价、单事务落库
//! - **状态机** (`orders::state_machine`): 订单状态与支付状态流转
//! - **支付** (`payment`): KBZPay 请求签名、回调验签与幂等处理
//! - **打印** (`printing`): 顾客小票、后厨单、HTML 打印视图
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── api/        # HTTP 路由和处理器
//! ├── db/         # SQLite 数据访问
//! ├── orders/     # 购物车、定价、下单、状态机
//! ├── payment/    # 支付网关适配
//! ├── printing/   # 小票渲染
//! ├── utils/      # 日志、时间、校验
//! ├── config.rs   # 环境变量配置
//! ├── error.rs    # 服务层错误
//! └── state.rs    # 共享状态
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod orders;
pub mod payment;
pub mod printing;
pub mod state;
pub mod utils;

// Re-export 公共类型
pub use config::Config;
pub use db::DbService;
pub use error::{ServiceError, ServiceResult};
pub use state::AppState;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
