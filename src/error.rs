use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入文档错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 字段提取错误
    #[error("提取错误: {0}")]
    Extract(#[from] ExtractError),
    /// 分类服务错误
    #[error("分类错误: {0}")]
    Classifier(#[from] ClassifierError),
    /// 响应解析错误
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输出错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
}

/// 输入文档错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// 缺少顶层 content 列表
    #[error("文档缺少顶层 `content` 列表")]
    MissingContent,
}

/// 单个节点的字段提取错误
///
/// 只在节点内部传播，最终会被转换为 `NodeOutcome::Defaulted`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// 节点不是 JSON 对象
    #[error("节点不是对象")]
    NotAnObject,
    /// 缺少必需字段
    #[error("缺少字段 `{field}`")]
    MissingField { field: String },
    /// 字段类型不匹配
    #[error("字段类型不匹配: {message}")]
    TypeMismatch { message: String },
    /// 子列表缺失或不是数组
    #[error("缺少子列表 `{key}`")]
    MissingList { key: String },
}

/// 分类服务错误
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// 请求构建失败
    #[error("请求构建失败: {message}")]
    RequestBuildFailed { message: String },
    /// API 调用失败
    #[error("API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 调用超时
    #[error("调用超时 ({secs} 秒)")]
    Timeout { secs: u64 },
}

/// 响应解析错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// 不是列表字面量
    #[error("响应不是列表字面量: {response}")]
    NotAList { response: String },
    /// 列表元素不是字符串
    #[error("字符位置 {position} 处的元素不是字符串: {response}")]
    NonStringItem { position: usize, response: String },
    /// 字符串未闭合
    #[error("字符串未闭合: {response}")]
    UnterminatedString { response: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("配置文件读取失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少 API 凭据
    #[error("缺少 LLM API 凭据 (LLM_API_KEY)")]
    MissingApiKey,
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 输出错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== 便捷构造函数 ==========

impl ExtractError {
    /// 创建缺少字段错误
    pub fn missing(field: impl Into<String>) -> Self {
        ExtractError::MissingField {
            field: field.into(),
        }
    }
}

impl ConfigError {
    /// 创建配置值非法错误
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl OutputError {
    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        OutputError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::from(ExtractError::missing("repairOrderId"));
        assert_eq!(err.to_string(), "提取错误: 缺少字段 `repairOrderId`");

        let err = AppError::from(ConfigError::MissingApiKey);
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn test_classifier_error_display() {
        let err = ClassifierError::Timeout { secs: 30 };
        assert_eq!(err.to_string(), "调用超时 (30 秒)");
    }
}
