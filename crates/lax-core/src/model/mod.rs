pub mod article;
pub mod article_version;
pub mod fragment;
pub mod journal;
pub mod status;

pub use article::{Article, ArticleDraft};
pub use article_version::{ArticleVersion, ArticleVersionDraft};
pub use fragment::{ArticleFragment, FragmentDraft};
pub use journal::{Journal, JournalDraft};
pub use status::Status;
