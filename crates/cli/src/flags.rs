use clap::ValueEnum;
use rag_vector_store::EmbeddingMode;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum EmbedModeFlag {
    Hashed,
    Stub,
}

impl EmbedModeFlag {
    pub(crate) const fn as_domain(self) -> EmbeddingMode {
        match self {
            EmbedModeFlag::Hashed => EmbeddingMode::Hashed,
            EmbedModeFlag::Stub => EmbeddingMode::Stub,
        }
    }
}
