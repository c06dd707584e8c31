//! JSON snapshot export of a session.
//!
//! Snapshots are write-only: the application never reads them back.
//!
//! # Output Structure
//!
//! Files are organized by date, named after the keyword and the export time:
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── 삼성전자_093012.json
//!     └── 금리_141500.json
//! ```

use crate::models::{Article, Turn};
use crate::outputs::insights::Insights;
use crate::session::Session;
use crate::utils::slugify;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub exported_at: DateTime<Local>,
    pub keyword: Option<&'a str>,
    pub articles: &'a [Article],
    pub transcript: &'a [Turn],
    pub insights: Insights,
}

impl<'a> Snapshot<'a> {
    pub fn of(session: &'a Session, exported_at: DateTime<Local>) -> Self {
        Self {
            exported_at,
            keyword: session.keyword(),
            articles: session.articles(),
            transcript: session.transcript(),
            insights: Insights::compute(session.keyword(), session.articles()),
        }
    }

    fn file_stem(&self) -> String {
        let slug = self.keyword.map(slugify).filter(|s| !s.is_empty());
        format!(
            "{}_{}",
            slug.as_deref().unwrap_or("session"),
            self.exported_at.format("%H%M%S")
        )
    }
}

/// Write a [`Snapshot`] of `session` under a date-based directory.
///
/// # Returns
///
/// The path of the written file.
///
/// # Output Path
///
/// The file is written to: `{json_output_dir}/{date}/{keyword}_{HHMMSS}.json`
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_snapshot(
    session: &Session,
    json_output_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let snapshot = Snapshot::of(session, Local::now());
    let json = serde_json::to_string_pretty(&snapshot)?;

    let full_json_dir = PathBuf::from(json_output_dir)
        .join(snapshot.exported_at.date_naive().to_string());
    info!(full_json_dir = %full_json_dir.display(), "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(full_json_dir = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let output_json_filename = full_json_dir.join(format!("{}.json", snapshot.file_stem()));
    fs::write(&output_json_filename, json).await?;
    info!(
        path = %output_json_filename.display(),
        articles = snapshot.articles.len(),
        turns = snapshot.transcript.len(),
        "Wrote session snapshot"
    );

    Ok(output_json_filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::models::tests::article;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_write_snapshot_creates_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::new();
        session.replace_working_set(
            "삼성전자 실적",
            vec![article("삼성전자 실적 발표", "반도체 회복", "2025-05-06", Category::Economy)],
        );
        session.push_turn(Turn::user("전망은?"));

        let path = write_snapshot(&session, dir.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(path.starts_with(dir.path()));
        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("삼성전자-실적_"));
        assert!(file_name.ends_with(".json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["keyword"], "삼성전자 실적");
        assert_eq!(written["articles"][0]["category"], "economy");
        assert_eq!(written["transcript"][0]["role"], "user");
        assert_eq!(written["insights"]["total"], 1);
    }

    #[test]
    fn test_file_stem_without_keyword() {
        let session = Session::new();
        let at = Local.with_ymd_and_hms(2025, 5, 6, 9, 30, 12).unwrap();
        assert_eq!(Snapshot::of(&session, at).file_stem(), "session_093012");
    }
}
