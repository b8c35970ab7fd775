//! Database schema and migrations for DevDigest.
//!
//! Each migration is applied once, in order, and recorded in the
//! `schema_version` table. Statements are separated by `;`, so comments
//! inside a migration must not contain one.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: articles table
    r#"
CREATE TABLE IF NOT EXISTS articles (
    id              TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    title_ko        TEXT,
    description     TEXT NOT NULL DEFAULT '',
    summary_ko      TEXT,
    keywords        TEXT,
    content_summary TEXT,
    source_url      TEXT NOT NULL UNIQUE,
    published_at    TEXT NOT NULL,
    platform        TEXT NOT NULL CHECK (platform IN ('android', 'ios', 'web', 'backend')),
    content_type    TEXT NOT NULL CHECK (content_type IN ('blog', 'video')),
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_platform ON articles(platform);
CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles(published_at DESC)
"#,
];
