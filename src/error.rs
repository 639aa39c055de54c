//! HTTP 层错误类型
//!
//! 服务层统一返回 `anyhow::Result`，在处理器边界转换为 `ApiError`，
//! 由 actix 渲染成统一的 `ApiResponse` 错误结构

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 调用方参数错误
    #[error("{0}")]
    BadRequest(String),

    /// 缺少或错误的认证信息
    #[error("无效的 Bearer Token")]
    Unauthorized,

    /// 资源不存在
    #[error("{0}")]
    NotFound(String),

    /// 外部存储或上游服务失败
    #[error("上游服务错误: {0}")]
    Upstream(#[source] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Upstream(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Upstream(e) = self {
            log::error!("上游调用失败: {:#}", e);
        }
        HttpResponse::build(self.status_code()).json(ApiResponse::<()>::error(self.to_string()))
    }
}
