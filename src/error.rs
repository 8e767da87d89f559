//! Error types shared across the pipeline.
//!
//! Every stage gets its own struct carrying a message and an optional
//! `(line, col)` position, following the same shape as the teacher
//! crate's `TypeError` rather than deriving errors with `thiserror`.
use std::fmt::{self, Display, Formatter};

pub type Position = (usize, usize);

macro_rules! stage_error {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub message: String,
            pub position: Option<Position>,
        }

        impl $name {
            pub fn new(message: impl Into<String>) -> Self {
                Self {
                    message: message.into(),
                    position: None,
                }
            }

            pub fn at(message: impl Into<String>, position: Position) -> Self {
                Self {
                    message: message.into(),
                    position: Some(position),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                match self.position {
                    Some((line, col)) => write!(f, "{} ({line}:{col})", self.message),
                    None => f.write_str(&self.message),
                }
            }
        }

        impl std::error::Error for $name {}
    };
}

stage_error!(LexError);
stage_error!(ParseError);
stage_error!(AnalyzeError);
stage_error!(EvaluateError);
stage_error!(AssertionError);

/// Unifies the per-stage errors for callers that run the whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Lex(LexError),
    Parse(ParseError),
    Analyze(AnalyzeError),
    Evaluate(EvaluateError),
    Generate(AssertionError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Lex(e) => write!(f, "lex error: {e}"),
            PipelineError::Parse(e) => write!(f, "parse error: {e}"),
            PipelineError::Analyze(e) => write!(f, "analyze error: {e}"),
            PipelineError::Evaluate(e) => write!(f, "evaluate error: {e}"),
            PipelineError::Generate(e) => write!(f, "generate error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<LexError> for PipelineError {
    fn from(e: LexError) -> Self {
        PipelineError::Lex(e)
    }
}

impl From<ParseError> for PipelineError {
    fn from(e: ParseError) -> Self {
        PipelineError::Parse(e)
    }
}

impl From<AnalyzeError> for PipelineError {
    fn from(e: AnalyzeError) -> Self {
        PipelineError::Analyze(e)
    }
}

impl From<EvaluateError> for PipelineError {
    fn from(e: EvaluateError) -> Self {
        PipelineError::Evaluate(e)
    }
}

impl From<AssertionError> for PipelineError {
    fn from(e: AssertionError) -> Self {
        PipelineError::Generate(e)
    }
}
