//! Support artifacts.
//!
//! The shared support artifacts are a fixed set emitted before any
//! resource artifact (resources depend on them). Additional support units
//! can be registered during construction and are emitted last, whether or
//! not resources exist.

use crate::engine::units::SupportRender;
use crate::engine::GenerationContext;
use crate::error::Result;
use crate::ts::{DeclKind, TsDecl, TsFile};

/// The fixed set of shared support artifacts.
pub fn shared_support() -> Vec<TsFile> {
    let api_error = TsDecl::new(
        "ApiError",
        DeclKind::Raw {
            code: concat!(
                "export class ApiError extends Error {\n",
                "  constructor(\n",
                "    public status: number,\n",
                "    public body: string,\n",
                "  ) {\n",
                "    super(`API error ${status}`);\n",
                "  }\n",
                "}\n",
            )
            .to_string(),
        },
    );

    let envelope = TsDecl::new(
        "ResponseEnvelope",
        DeclKind::Raw {
            code: concat!(
                "export interface ResponseEnvelope<T> {\n",
                "  status: number;\n",
                "  body: T;\n",
                "}\n",
            )
            .to_string(),
        },
    );

    vec![TsFile::plain(api_error), TsFile::plain(envelope)]
}

/// Support unit wrapping a prebuilt file.
#[derive(Debug, Clone)]
pub struct StaticSupportUnit {
    file: TsFile,
}

impl StaticSupportUnit {
    /// A unit emitting the given file as-is.
    pub fn new(file: TsFile) -> Self {
        Self { file }
    }
}

impl SupportRender for StaticSupportUnit {
    fn render(&self, _ctx: &GenerationContext<'_>) -> Result<TsFile> {
        Ok(self.file.clone())
    }
}

/// Shared runtime helper types registered by the built-in finder's setup
/// hook.
pub fn runtime_types() -> StaticSupportUnit {
    StaticSupportUnit::new(TsFile::plain(TsDecl::new(
        "RuntimeTypes",
        DeclKind::Raw {
            code: "export type Maybe<T> = T | null | undefined;\n".to_string(),
        },
    )))
}
