use std::fmt;
use std::path::PathBuf;

/// Identifies which stage of a program build produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Fatal render-path failures. None of these are recovered locally: there is
/// no retry, backoff, or degraded-mode rendering. Callers surface them and
/// the loop never starts (or stops where it stands).
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("failed to link shader program: {log}")]
    Link { log: String },
    #[error("failed to load image asset {path}: {reason}")]
    AssetLoad { path: PathBuf, reason: String },
    #[error("shader binding contract violated: {0}")]
    BindingFault(String),
}
